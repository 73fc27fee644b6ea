//! Categorical constraint handling.
//!
//! Two pure operations: folding several categorical labelings into one
//! constraint partition, and drawing a random initial assignment that
//! spreads each constraint class as evenly as possible over the groups
//! while hitting the requested group sizes exactly. The constraint
//! partition is an explicit value threaded through the engine, never
//! ambient state.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{Error, Result};

/// Merges one or more categorical label vectors into a single
/// partition.
///
/// The distinct values of the result are the *observed* combinations
/// of input labels (not the full Cartesian product); combinations are
/// numbered in order of first appearance, so the result is
/// deterministic for a given input.
pub fn merge_partitions(partitions: &[Vec<usize>]) -> Result<Vec<usize>> {
    let first = partitions
        .first()
        .ok_or_else(|| Error::invalid("no partitions to merge"))?;
    let n = first.len();
    for (idx, p) in partitions.iter().enumerate() {
        if p.len() != n {
            return Err(Error::invalid(format!(
                "partition {idx} has length {}, expected {n}",
                p.len()
            )));
        }
    }

    let mut seen: HashMap<Vec<usize>, usize> = HashMap::new();
    let mut merged = Vec::with_capacity(n);
    for i in 0..n {
        let combo: Vec<usize> = partitions.iter().map(|p| p[i]).collect();
        let next = seen.len();
        let label = *seen.entry(combo).or_insert(next);
        merged.push(label);
    }
    Ok(merged)
}

/// Draws a random assignment that honours `sizes` exactly while
/// spreading each class of `classes` as evenly as possible across
/// groups.
///
/// Classes are placed largest-first; within a class, members are
/// visited in random order and each lands in the group that currently
/// holds the fewest members of that class (largest remaining capacity,
/// then lowest index, on ties). A class with more members than groups
/// degrades gracefully to at most ⌈class size / K⌉ members per group.
pub fn categorical_sampling<R: Rng>(
    classes: &[usize],
    sizes: &[usize],
    rng: &mut R,
) -> Vec<usize> {
    let n = classes.len();
    let k = sizes.len();
    debug_assert_eq!(sizes.iter().sum::<usize>(), n);

    let mut members: HashMap<usize, Vec<usize>> = HashMap::new();
    for (i, &c) in classes.iter().enumerate() {
        members.entry(c).or_default().push(i);
    }
    // Largest classes first; label breaks ties to keep placement
    // order independent of hash iteration.
    let mut class_order: Vec<usize> = members.keys().copied().collect();
    class_order.sort_by_key(|c| (usize::MAX - members[c].len(), *c));

    let mut capacity = sizes.to_vec();
    let mut assignment = vec![0usize; n];
    for c in class_order {
        let mut elems = members.remove(&c).unwrap_or_default();
        elems.shuffle(rng);
        let mut in_group = vec![0usize; k];
        for i in elems {
            let g = (0..k)
                .filter(|&g| capacity[g] > 0)
                .min_by_key(|&g| (in_group[g], usize::MAX - capacity[g], g))
                .expect("capacities sum to the number of elements");
            assignment[i] = g;
            capacity[g] -= 1;
            in_group[g] += 1;
        }
    }
    assignment
}
