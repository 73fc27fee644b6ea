//! Run configuration for the anticlustering entry point.

use crate::error::{Error, Result};
use crate::objective::Objective;

/// How the groups are specified.
#[derive(Debug, Clone)]
pub enum GroupSpec {
    /// K equal-size groups; when K does not divide N, the first
    /// `N mod K` groups receive one extra element.
    Count(usize),
    /// A full-length label vector fixing both K and the group sizes,
    /// and serving as the initial assignment of the first repetition.
    Labels(Vec<usize>),
}

/// Optimization method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Method {
    /// One full exchange pass. The default.
    #[default]
    Exchange,
    /// Exchange passes repeated to a local maximum.
    LocalMaximum,
    /// Exact 0/1 integer programming via an external solver
    /// (diversity objective only).
    Exact,
}

/// Configuration for one anticlustering invocation.
///
/// # Examples
///
/// ```
/// use anticlust::driver::{AnticlustConfig, Method};
/// use anticlust::objective::Objective;
///
/// let config = AnticlustConfig::new(3)
///     .with_objective(Objective::Variance)
///     .with_method(Method::LocalMaximum)
///     .with_repetitions(10)
///     .with_seed(42);
/// assert_eq!(config.repetitions, 10);
/// ```
#[derive(Debug, Clone)]
pub struct AnticlustConfig {
    /// Group count or explicit initial labels.
    pub groups: GroupSpec,
    /// Objective to maximize.
    pub objective: Objective,
    /// Optimization method.
    pub method: Method,
    /// Whether to forbid mutually similar elements (matched into
    /// groups of K) from sharing an anticluster.
    pub preclustering: bool,
    /// Zero or more categorical label vectors to balance across
    /// groups; merged into one constraint partition.
    pub categories: Vec<Vec<usize>>,
    /// Number of independent restarts; the best result is kept.
    pub repetitions: usize,
    /// Whether to run repetitions on parallel workers (requires the
    /// `parallel` feature; ignored otherwise).
    pub parallel: bool,
    /// Random seed (None for random). Repetition `r` derives its own
    /// seed from the base seed plus `r`.
    pub seed: Option<u64>,
}

impl AnticlustConfig {
    /// Creates a configuration for `k` equal-size groups with the
    /// diversity objective and a single exchange pass.
    pub fn new(k: usize) -> Self {
        Self::with_groups(GroupSpec::Count(k))
    }

    /// Creates a configuration from an explicit initial label vector.
    pub fn from_labels(labels: Vec<usize>) -> Self {
        Self::with_groups(GroupSpec::Labels(labels))
    }

    fn with_groups(groups: GroupSpec) -> Self {
        Self {
            groups,
            objective: Objective::Diversity,
            method: Method::default(),
            preclustering: false,
            categories: Vec::new(),
            repetitions: 1,
            parallel: true,
            seed: None,
        }
    }

    /// Sets the objective.
    pub fn with_objective(mut self, objective: Objective) -> Self {
        self.objective = objective;
        self
    }

    /// Sets the optimization method.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Enables or disables preclustering constraints.
    pub fn with_preclustering(mut self, preclustering: bool) -> Self {
        self.preclustering = preclustering;
        self
    }

    /// Adds one categorical label vector.
    pub fn with_category(mut self, category: Vec<usize>) -> Self {
        self.categories.push(category);
        self
    }

    /// Sets the number of independent repetitions.
    pub fn with_repetitions(mut self, n: usize) -> Self {
        self.repetitions = n;
        self
    }

    /// Enables or disables parallel repetitions.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates data-independent parameters.
    pub fn validate(&self) -> Result<()> {
        if self.repetitions == 0 {
            return Err(Error::invalid("repetitions must be at least 1"));
        }
        match &self.groups {
            GroupSpec::Count(k) if *k < 2 => {
                Err(Error::invalid(format!("group count must be at least 2, got {k}")))
            }
            GroupSpec::Labels(labels) if labels.is_empty() => {
                Err(Error::invalid("label vector is empty"))
            }
            _ => Ok(()),
        }
    }

    /// Resolves the group sizes for `n` elements, plus the normalized
    /// initial assignment when explicit labels were supplied.
    ///
    /// Distinct labels are renumbered to `0..K` in sorted order.
    pub(crate) fn resolve_groups(&self, n: usize) -> Result<(Vec<usize>, Option<Vec<usize>>)> {
        match &self.groups {
            GroupSpec::Count(k) => {
                let k = *k;
                if k > n {
                    return Err(Error::invalid(format!(
                        "group count {k} exceeds element count {n}"
                    )));
                }
                let base = n / k;
                let extra = n % k;
                let sizes = (0..k)
                    .map(|g| if g < extra { base + 1 } else { base })
                    .collect();
                Ok((sizes, None))
            }
            GroupSpec::Labels(labels) => {
                if labels.len() != n {
                    return Err(Error::invalid(format!(
                        "label vector has length {}, expected {n}",
                        labels.len()
                    )));
                }
                let mut distinct: Vec<usize> = labels.clone();
                distinct.sort_unstable();
                distinct.dedup();
                if distinct.len() < 2 {
                    return Err(Error::invalid("label vector must name at least 2 groups"));
                }
                let normalized: Vec<usize> = labels
                    .iter()
                    .map(|l| distinct.binary_search(l).expect("label is present"))
                    .collect();
                let mut sizes = vec![0usize; distinct.len()];
                for &g in &normalized {
                    sizes[g] += 1;
                }
                Ok((sizes, Some(normalized)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnticlustConfig::new(3);
        assert!(matches!(config.groups, GroupSpec::Count(3)));
        assert_eq!(config.method, Method::Exchange);
        assert!(!config.preclustering);
        assert!(config.categories.is_empty());
        assert_eq!(config.repetitions, 1);
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_parameters() {
        assert!(AnticlustConfig::new(1).validate().is_err());
        assert!(AnticlustConfig::new(2)
            .with_repetitions(0)
            .validate()
            .is_err());
        assert!(AnticlustConfig::from_labels(vec![]).validate().is_err());
    }

    #[test]
    fn test_remainder_distribution() {
        // 10 elements over 3 groups: the first group gets the extra.
        let config = AnticlustConfig::new(3);
        let (sizes, initial) = config.resolve_groups(10).unwrap();
        assert_eq!(sizes, vec![4, 3, 3]);
        assert!(initial.is_none());

        let (sizes, _) = AnticlustConfig::new(4).resolve_groups(11).unwrap();
        assert_eq!(sizes, vec![3, 3, 3, 2]);
    }

    #[test]
    fn test_count_exceeding_n_rejected() {
        assert!(AnticlustConfig::new(5).resolve_groups(4).is_err());
    }

    #[test]
    fn test_labels_fix_sizes_and_are_normalized() {
        let config = AnticlustConfig::from_labels(vec![7, 3, 7, 3, 7]);
        let (sizes, initial) = config.resolve_groups(5).unwrap();
        assert_eq!(sizes, vec![2, 3]);
        assert_eq!(initial.unwrap(), vec![1, 0, 1, 0, 1]);
    }

    #[test]
    fn test_labels_length_mismatch() {
        let config = AnticlustConfig::from_labels(vec![0, 1]);
        assert!(config.resolve_groups(3).is_err());
    }

    #[test]
    fn test_single_distinct_label_rejected() {
        let config = AnticlustConfig::from_labels(vec![1, 1, 1]);
        assert!(config.resolve_groups(3).is_err());
    }
}
