//! Sequential nearest-neighbour matching.
//!
//! Repeatedly picks an unmatched target (per the configured order),
//! gathers its nearest unmatched eligible neighbours into a group,
//! removes them from the pool and continues. Elements that cannot
//! fill a complete group receive fresh singleton labels, so they
//! impose no constraint downstream.

use crate::data::DistanceMatrix;
use crate::error::{Error, Result};
use crate::matching::config::{MatchConfig, MatchOrder, MatchScope};

/// Runs the matching generator.
pub struct MatchRunner;

impl MatchRunner {
    /// Produces a constraint partition over the elements of
    /// `distances`: full groups of `config.group_size` mutually close
    /// elements share a label, leftovers get singleton labels.
    pub fn run(distances: &DistanceMatrix, config: &MatchConfig) -> Result<Vec<usize>> {
        let n = distances.len();
        if config.group_size < 2 {
            return Err(Error::invalid("matching group size must be at least 2"));
        }
        match &config.scope {
            MatchScope::All => {}
            MatchScope::Within(p) | MatchScope::Between(p) => {
                if p.len() != n {
                    return Err(Error::invalid(format!(
                        "matching scope partition has length {}, expected {n}",
                        p.len()
                    )));
                }
            }
        }
        if let MatchScope::Between(p) = &config.scope {
            let mut classes: Vec<usize> = p.clone();
            classes.sort_unstable();
            classes.dedup();
            if classes.len() != config.group_size {
                return Err(Error::invalid(format!(
                    "between-scope matching needs group size {} (one per class), got {}",
                    classes.len(),
                    config.group_size
                )));
            }
        }

        // Extremity is a global property of each element, so totals are
        // computed once over the full matrix, not over the shrinking pool.
        let totals: Vec<f64> = (0..n).map(|i| distances.total_distance(i)).collect();

        let mut labels = vec![usize::MAX; n];
        let mut unmatched = vec![true; n];
        let mut remaining = n;
        let mut next_label = 0;

        while remaining > 0 {
            let target = pick_target(&unmatched, &totals, config.order);
            let partners = pick_partners(distances, &unmatched, target, config);

            if let Some(partners) = partners {
                labels[target] = next_label;
                unmatched[target] = false;
                remaining -= 1;
                for j in partners {
                    labels[j] = next_label;
                    unmatched[j] = false;
                    remaining -= 1;
                }
            } else {
                // Not enough eligible partners left: singleton.
                labels[target] = next_label;
                unmatched[target] = false;
                remaining -= 1;
            }
            next_label += 1;
        }

        Ok(labels)
    }
}

fn pick_target(unmatched: &[bool], totals: &[f64], order: MatchOrder) -> usize {
    let candidates = unmatched
        .iter()
        .enumerate()
        .filter(|(_, &u)| u)
        .map(|(i, _)| i);
    match order {
        MatchOrder::Index => candidates.min().expect("pool is non-empty"),
        MatchOrder::ExtremeFirst => {
            let mut best = usize::MAX;
            let mut best_total = f64::NEG_INFINITY;
            for i in candidates {
                if totals[i] > best_total {
                    best_total = totals[i];
                    best = i;
                }
            }
            best
        }
    }
}

/// Returns the partner set completing the target's group, or `None`
/// when the pool cannot supply a full group.
fn pick_partners(
    distances: &DistanceMatrix,
    unmatched: &[bool],
    target: usize,
    config: &MatchConfig,
) -> Option<Vec<usize>> {
    let n = unmatched.len();
    match &config.scope {
        MatchScope::All | MatchScope::Within(_) => {
            let mut eligible: Vec<usize> = (0..n)
                .filter(|&j| j != target && unmatched[j])
                .filter(|&j| match &config.scope {
                    MatchScope::Within(p) => p[j] == p[target],
                    _ => true,
                })
                .collect();
            if eligible.len() < config.group_size - 1 {
                return None;
            }
            eligible.sort_by(|&a, &b| {
                distances
                    .get(target, a)
                    .partial_cmp(&distances.get(target, b))
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.cmp(&b))
            });
            eligible.truncate(config.group_size - 1);
            Some(eligible)
        }
        MatchScope::Between(p) => {
            // One nearest unmatched element from each class other
            // than the target's.
            let mut classes: Vec<usize> = p.iter().copied().collect();
            classes.sort_unstable();
            classes.dedup();
            let mut partners = Vec::with_capacity(config.group_size - 1);
            for &c in classes.iter().filter(|&&c| c != p[target]) {
                let nearest = (0..n)
                    .filter(|&j| j != target && unmatched[j] && p[j] == c)
                    .min_by(|&a, &b| {
                        distances
                            .get(target, a)
                            .partial_cmp(&distances.get(target, b))
                            .unwrap_or(std::cmp::Ordering::Equal)
                            .then(a.cmp(&b))
                    })?;
                partners.push(nearest);
            }
            Some(partners)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FeatureMatrix;

    fn distances_1d(values: &[f64]) -> DistanceMatrix {
        let rows: Vec<Vec<f64>> = values.iter().map(|&v| vec![v]).collect();
        DistanceMatrix::euclidean(&FeatureMatrix::from_rows(&rows).unwrap())
    }

    fn group_of(labels: &[usize], label: usize) -> Vec<usize> {
        (0..labels.len()).filter(|&i| labels[i] == label).collect()
    }

    #[test]
    fn test_pairs_match_nearest_neighbours() {
        let distances = distances_1d(&[0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);
        let config = MatchConfig::new(2);
        let labels = MatchRunner::run(&distances, &config).unwrap();

        // Every group has exactly two members and the two ends of the
        // scale are paired with their immediate neighbours.
        for label in 0..3 {
            assert_eq!(group_of(&labels, label).len(), 2);
        }
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[4], labels[5]);
    }

    #[test]
    fn test_index_order_matches_first_element_first() {
        let distances = distances_1d(&[0.0, 5.0, 1.0, 6.0]);
        let config = MatchConfig::new(2).with_order(MatchOrder::Index);
        let labels = MatchRunner::run(&distances, &config).unwrap();

        // Element 0 is matched first, with its nearest neighbour 2.
        assert_eq!(labels[0], 0);
        assert_eq!(labels[2], 0);
        assert_eq!(labels[1], labels[3]);
    }

    #[test]
    fn test_leftover_becomes_singleton() {
        let distances = distances_1d(&[0.0, 1.0, 10.0, 11.0, 50.0]);
        let config = MatchConfig::new(2);
        let labels = MatchRunner::run(&distances, &config).unwrap();

        let mut sizes: Vec<usize> = Vec::new();
        let max_label = *labels.iter().max().unwrap();
        for label in 0..=max_label {
            sizes.push(group_of(&labels, label).len());
        }
        sizes.sort_unstable();
        assert_eq!(sizes, vec![1, 2, 2]);
    }

    #[test]
    fn test_all_labels_distinct_groups() {
        let distances = distances_1d(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        let labels = MatchRunner::run(&distances, &MatchConfig::new(3)).unwrap();
        let mut distinct = labels.clone();
        distinct.sort_unstable();
        distinct.dedup();
        assert_eq!(distinct.len(), 2);
    }

    #[test]
    fn test_within_scope_keeps_classes_separate() {
        let distances = distances_1d(&[0.0, 0.5, 1.0, 1.5, 2.0, 2.5]);
        let partition = vec![0, 1, 0, 1, 0, 1];
        let config =
            MatchConfig::new(2).with_scope(MatchScope::Within(partition.clone()));
        let labels = MatchRunner::run(&distances, &config).unwrap();

        for i in 0..6 {
            for j in (i + 1)..6 {
                if labels[i] == labels[j] {
                    assert_eq!(
                        partition[i], partition[j],
                        "elements {i} and {j} matched across classes"
                    );
                }
            }
        }
    }

    #[test]
    fn test_between_scope_takes_one_per_class() {
        let distances = distances_1d(&[0.0, 1.0, 10.0, 11.0]);
        let partition = vec![0, 0, 1, 1];
        let config =
            MatchConfig::new(2).with_scope(MatchScope::Between(partition.clone()));
        let labels = MatchRunner::run(&distances, &config).unwrap();

        for i in 0..4 {
            for j in (i + 1)..4 {
                if labels[i] == labels[j] {
                    assert_ne!(
                        partition[i], partition[j],
                        "elements {i} and {j} matched inside one class"
                    );
                }
            }
        }
    }

    #[test]
    fn test_between_scope_requires_matching_group_size() {
        let distances = distances_1d(&[0.0, 1.0, 2.0, 3.0]);
        let config = MatchConfig::new(3).with_scope(MatchScope::Between(vec![0, 0, 1, 1]));
        assert!(MatchRunner::run(&distances, &config).is_err());
    }

    #[test]
    fn test_rejects_tiny_group_size() {
        let distances = distances_1d(&[0.0, 1.0]);
        assert!(MatchRunner::run(&distances, &MatchConfig::new(1)).is_err());
    }

    #[test]
    fn test_scope_length_validated() {
        let distances = distances_1d(&[0.0, 1.0, 2.0]);
        let config = MatchConfig::new(2).with_scope(MatchScope::Within(vec![0, 1]));
        assert!(MatchRunner::run(&distances, &config).is_err());
    }
}
