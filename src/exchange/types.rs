//! Problem definition for the exchange engine.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::categories::categorical_sampling;
use crate::data::Data;
use crate::error::{Error, Result};
use crate::objective::Objective;

/// When the exchange engine stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Termination {
    /// Exactly one full pass over all elements. The default.
    #[default]
    SinglePass,
    /// Full passes until one commits zero swaps: a local maximum
    /// under the pairwise-swap neighbourhood.
    LocalMaximum,
}

/// An anticlustering instance for the exchange engine: the data, the
/// objective, the fixed group sizes, and an optional constraint
/// partition.
///
/// Shared inputs are borrowed and read-only, so one problem can back
/// many repetitions in parallel.
pub struct ExchangeProblem<'a> {
    data: &'a Data,
    objective: &'a Objective,
    group_sizes: Vec<usize>,
    constraints: Option<Vec<usize>>,
}

impl<'a> ExchangeProblem<'a> {
    /// Creates a problem over `data` with the given per-group sizes.
    pub fn new(
        data: &'a Data,
        objective: &'a Objective,
        group_sizes: Vec<usize>,
    ) -> Result<Self> {
        let n = data.len();
        if n == 0 {
            return Err(Error::invalid("no elements to assign"));
        }
        if group_sizes.len() < 2 {
            return Err(Error::invalid("need at least two groups"));
        }
        if group_sizes.iter().any(|&s| s == 0) {
            return Err(Error::invalid("group sizes must be positive"));
        }
        let total: usize = group_sizes.iter().sum();
        if total != n {
            return Err(Error::invalid(format!(
                "group sizes sum to {total}, expected {n}"
            )));
        }
        Ok(Self {
            data,
            objective,
            group_sizes,
            constraints: None,
        })
    }

    /// Attaches a constraint partition. Exchange partners are then
    /// restricted to elements of the same constraint class, which
    /// preserves each group's class composition.
    pub fn with_constraints(mut self, partition: Vec<usize>) -> Result<Self> {
        if partition.len() != self.n() {
            return Err(Error::invalid(format!(
                "constraint partition has length {}, expected {}",
                partition.len(),
                self.n()
            )));
        }
        self.constraints = Some(partition);
        Ok(self)
    }

    /// Number of elements.
    pub fn n(&self) -> usize {
        self.data.len()
    }

    /// Number of groups.
    pub fn k(&self) -> usize {
        self.group_sizes.len()
    }

    /// The run's data.
    pub fn data(&self) -> &'a Data {
        self.data
    }

    /// The objective to maximize.
    pub fn objective(&self) -> &'a Objective {
        self.objective
    }

    /// Fixed group sizes.
    pub fn group_sizes(&self) -> &[usize] {
        &self.group_sizes
    }

    /// The constraint partition, if any.
    pub fn constraints(&self) -> Option<&[usize]> {
        self.constraints.as_deref()
    }

    /// Draws a random initial assignment respecting the group sizes.
    ///
    /// Under a constraint partition the draw is class-balanced, which
    /// establishes the composition the swap filter then preserves.
    pub fn random_assignment<R: Rng>(&self, rng: &mut R) -> Vec<usize> {
        match &self.constraints {
            Some(classes) => categorical_sampling(classes, &self.group_sizes, rng),
            None => {
                let mut pool = Vec::with_capacity(self.n());
                for (g, &size) in self.group_sizes.iter().enumerate() {
                    pool.extend(std::iter::repeat(g).take(size));
                }
                pool.shuffle(rng);
                pool
            }
        }
    }
}
