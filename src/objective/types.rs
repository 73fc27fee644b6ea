//! Objective selection.

use std::fmt;
use std::sync::Arc;

use crate::data::Data;

/// Scoring function type for user-supplied objectives.
///
/// Takes the run's data and a candidate assignment, returns a scalar.
/// Larger values are better; the engine maximizes every objective.
pub type ScoringFn = dyn Fn(&Data, &[usize]) -> f64 + Send + Sync;

/// The objective to maximize.
///
/// The built-in variants support incremental swap deltas in the
/// evaluator; [`Objective::Custom`] wraps an opaque scoring function
/// and falls back to full recomputation per candidate swap.
#[derive(Clone)]
pub enum Objective {
    /// Sum over all groups of pairwise within-group distances
    /// (the cluster-editing criterion).
    Diversity,
    /// Sum over all groups of squared Euclidean distances between
    /// each element and its group centroid. Requires feature data.
    Variance,
    /// The variance criterion on a feature matrix augmented with one
    /// squared-deviation-from-the-grand-mean column per original
    /// feature, balancing both group means and spreads.
    KPlus,
    /// An arbitrary user-supplied scoring function.
    Custom(Arc<ScoringFn>),
}

impl Objective {
    /// Wraps a closure as a custom objective.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&Data, &[usize]) -> f64 + Send + Sync + 'static,
    {
        Objective::Custom(Arc::new(f))
    }

    /// Short name for logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Objective::Diversity => "diversity",
            Objective::Variance => "variance",
            Objective::KPlus => "kplus",
            Objective::Custom(_) => "custom",
        }
    }

    /// Whether the objective can be expressed as a 0/1 integer linear
    /// program. Only the diversity criterion is linearizable.
    pub fn is_linearizable(&self) -> bool {
        matches!(self, Objective::Diversity)
    }

    /// Whether the objective needs raw feature vectors (centroids
    /// cannot be computed from a distance matrix).
    pub fn requires_features(&self) -> bool {
        matches!(self, Objective::Variance | Objective::KPlus)
    }
}

impl fmt::Debug for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(Objective::Diversity.name(), "diversity");
        assert_eq!(Objective::Variance.name(), "variance");
        assert_eq!(Objective::KPlus.name(), "kplus");
        assert_eq!(Objective::custom(|_, _| 0.0).name(), "custom");
    }

    #[test]
    fn test_linearizable() {
        assert!(Objective::Diversity.is_linearizable());
        assert!(!Objective::Variance.is_linearizable());
        assert!(!Objective::KPlus.is_linearizable());
        assert!(!Objective::custom(|_, _| 0.0).is_linearizable());
    }

    #[test]
    fn test_requires_features() {
        assert!(!Objective::Diversity.requires_features());
        assert!(Objective::Variance.requires_features());
        assert!(Objective::KPlus.requires_features());
    }
}
