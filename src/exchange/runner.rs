//! Exchange engine execution.
//!
//! # Algorithm
//!
//! 1. Start from a caller-supplied or random size-respecting assignment
//! 2. One pass: for each element i in index order:
//!    a. Enumerate candidate partners in every other group (same
//!       constraint class only, when a partition is active)
//!    b. Evaluate the objective delta of each candidate swap
//!    c. Commit the single best strictly-improving swap, if any,
//!       before moving on to the next element
//! 3. Stop after one pass, or repeat passes until none commits a swap
//!
//! Swaps preserve group sizes by construction; the objective is
//! non-decreasing across accepted swaps.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::trace;

use super::config::ExchangeConfig;
use super::types::{ExchangeProblem, Termination};
use crate::error::{Error, Result};
use crate::objective::Evaluator;

/// Deltas at or below this margin do not count as improvements.
const IMPROVEMENT_EPS: f64 = 1e-12;

/// Result of one exchange run.
#[derive(Debug, Clone)]
pub struct ExchangeResult {
    /// Final assignment, group labels in `[0, K)`.
    pub assignment: Vec<usize>,
    /// Objective value of the final assignment.
    pub objective_value: f64,
    /// Objective value of the initial assignment.
    pub initial_objective: f64,
    /// Full passes executed.
    pub passes: usize,
    /// Total swaps committed.
    pub swaps: usize,
    /// Objective value after each pass (starting with the initial value).
    pub objective_history: Vec<f64>,
}

/// Exchange engine runner.
pub struct ExchangeRunner;

impl ExchangeRunner {
    /// Runs the exchange engine from a random initial assignment.
    pub fn run(problem: &ExchangeProblem<'_>, config: &ExchangeConfig) -> Result<ExchangeResult> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };
        let initial = problem.random_assignment(&mut rng);
        Self::run_from(problem, initial, config)
    }

    /// Runs the exchange engine from the given initial assignment.
    ///
    /// The assignment must match the problem's element count and
    /// group sizes exactly; sizes never change during optimization.
    pub fn run_from(
        problem: &ExchangeProblem<'_>,
        initial: Vec<usize>,
        config: &ExchangeConfig,
    ) -> Result<ExchangeResult> {
        config.validate().map_err(Error::InvalidInput)?;

        let n = problem.n();
        let k = problem.k();
        if initial.len() != n {
            return Err(Error::invalid(format!(
                "initial assignment has length {}, expected {n}",
                initial.len()
            )));
        }
        let mut counts = vec![0usize; k];
        for &g in &initial {
            if g >= k {
                return Err(Error::invalid(format!("initial label {g} outside [0, {k})")));
            }
            counts[g] += 1;
        }
        if counts != problem.group_sizes() {
            return Err(Error::invalid(
                "initial assignment does not match the requested group sizes",
            ));
        }

        let mut assignment = initial;
        let mut evaluator =
            Evaluator::new(problem.data(), problem.objective(), &assignment, k)?;
        let initial_objective = evaluator.value();
        let mut objective_history = vec![initial_objective];

        let constraints = problem.constraints();
        let mut passes = 0;
        let mut total_swaps = 0;

        loop {
            let mut pass_swaps = 0;
            for i in 0..n {
                let g = assignment[i];
                let mut best_delta = IMPROVEMENT_EPS;
                let mut best_partner = None;
                for j in 0..n {
                    if assignment[j] == g {
                        continue;
                    }
                    if let Some(classes) = constraints {
                        if classes[j] != classes[i] {
                            continue;
                        }
                    }
                    let delta = evaluator.swap_delta(&mut assignment, i, j);
                    if delta > best_delta {
                        best_delta = delta;
                        best_partner = Some(j);
                    }
                }
                if let Some(j) = best_partner {
                    evaluator.commit_swap(&assignment, i, j);
                    assignment.swap(i, j);
                    pass_swaps += 1;
                }
            }

            passes += 1;
            total_swaps += pass_swaps;
            objective_history.push(evaluator.value());
            trace!(pass = passes, swaps = pass_swaps, objective = evaluator.value());

            let done = match config.termination {
                Termination::SinglePass => true,
                Termination::LocalMaximum => pass_swaps == 0 || passes >= config.max_passes,
            };
            if done {
                break;
            }
        }

        Ok(ExchangeResult {
            objective_value: evaluator.value(),
            assignment,
            initial_objective,
            passes,
            swaps: total_swaps,
            objective_history,
        })
    }
}
