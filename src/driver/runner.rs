//! Run orchestration.
//!
//! Validates the invocation, resolves the constraint partition once,
//! then dispatches: the heuristic path runs R independent exchange
//! repetitions (embarrassingly parallel; only the final best-result
//! selection synchronizes) and the exact path formulates the integer
//! program for an external solver.

use tracing::debug;

use super::config::{AnticlustConfig, Method};
use crate::data::Data;
use crate::error::{Error, Result};
use crate::exchange::{ExchangeConfig, ExchangeProblem, ExchangeResult, ExchangeRunner, Termination};
use crate::ilp::{parse_assignment, IlpModel, IlpSolver, SolverConfig};
use crate::matching::{MatchConfig, MatchRunner, MatchScope};
use crate::objective::objective_value;

/// Result of an anticlustering invocation.
#[derive(Debug, Clone)]
pub struct AnticlustResult {
    /// Group label per element, values in `[0, K)`.
    pub assignment: Vec<usize>,
    /// Objective value of the returned assignment.
    pub objective_value: f64,
    /// Number of repetitions executed.
    pub repetitions: usize,
    /// Index of the repetition that produced the result.
    pub best_repetition: usize,
    /// Exchange passes of the winning repetition (0 on the exact path).
    pub passes: usize,
    /// Swaps committed by the winning repetition (0 on the exact path).
    pub swaps: usize,
}

/// Entry point and restart driver.
pub struct AnticlustRunner;

impl AnticlustRunner {
    /// Runs the configured heuristic method.
    ///
    /// [`Method::Exact`] needs an external solver and is rejected here
    /// with [`Error::SolverUnavailable`]; use
    /// [`AnticlustRunner::run_with_solver`] instead.
    pub fn run(data: &Data, config: &AnticlustConfig) -> Result<AnticlustResult> {
        match config.method {
            Method::Exact => Err(Error::SolverUnavailable(
                "no solver configured for the exact method; use run_with_solver".into(),
            )),
            _ => Self::run_heuristic(data, config),
        }
    }

    /// Runs with an external ILP solver available for the exact path.
    ///
    /// Heuristic methods ignore the solver.
    pub fn run_with_solver(
        data: &Data,
        config: &AnticlustConfig,
        solver: &dyn IlpSolver,
    ) -> Result<AnticlustResult> {
        match config.method {
            Method::Exact => Self::run_exact(data, config, solver),
            _ => Self::run_heuristic(data, config),
        }
    }

    fn run_heuristic(data: &Data, config: &AnticlustConfig) -> Result<AnticlustResult> {
        Self::check_input(data, config)?;

        let n = data.len();
        let (sizes, initial) = config.resolve_groups(n)?;
        let k = sizes.len();
        let constraints = Self::resolve_constraints(data, config, k)?;

        let mut problem = ExchangeProblem::new(data, &config.objective, sizes)?;
        if let Some(partition) = constraints {
            problem = problem.with_constraints(partition)?;
        }

        let termination = match config.method {
            Method::Exchange => Termination::SinglePass,
            Method::LocalMaximum => Termination::LocalMaximum,
            Method::Exact => unreachable!("exact method is dispatched separately"),
        };
        let base_seed = config.seed.unwrap_or_else(rand::random);
        debug!(
            n,
            k,
            method = ?config.method,
            objective = config.objective.name(),
            repetitions = config.repetitions,
            "starting anticlustering run"
        );

        let run_repetition = |r: usize| -> Result<ExchangeResult> {
            let rep_config = ExchangeConfig::default()
                .with_termination(termination)
                .with_seed(base_seed.wrapping_add(r as u64));
            match (&initial, r) {
                (Some(labels), 0) => ExchangeRunner::run_from(&problem, labels.clone(), &rep_config),
                _ => ExchangeRunner::run(&problem, &rep_config),
            }
        };
        let mut results = collect_repetitions(config.repetitions, config.parallel, run_repetition)?;

        let mut best = 0;
        for r in 1..results.len() {
            if results[r].objective_value > results[best].objective_value {
                best = r;
            }
        }
        let winner = results.swap_remove(best);
        debug!(
            objective = winner.objective_value,
            best_repetition = best,
            passes = winner.passes,
            "selected best repetition"
        );

        Ok(AnticlustResult {
            assignment: winner.assignment,
            objective_value: winner.objective_value,
            repetitions: config.repetitions,
            best_repetition: best,
            passes: winner.passes,
            swaps: winner.swaps,
        })
    }

    fn run_exact(
        data: &Data,
        config: &AnticlustConfig,
        solver: &dyn IlpSolver,
    ) -> Result<AnticlustResult> {
        Self::check_input(data, config)?;

        if !config.objective.is_linearizable() {
            return Err(Error::ObjectiveMismatch(format!(
                "the {} objective cannot be formulated as a 0/1 linear program",
                config.objective.name()
            )));
        }
        if !config.categories.is_empty() {
            return Err(Error::invalid(
                "categorical constraints are not supported with the exact method",
            ));
        }

        let n = data.len();
        let (sizes, _) = config.resolve_groups(n)?;
        let k = sizes.len();
        if sizes.iter().any(|&s| s != n / k) {
            return Err(Error::invalid(
                "the exact method requires equal group sizes",
            ));
        }

        let distances = data.to_distances();
        let forbidden = if config.preclustering {
            let preclusters = MatchRunner::run(&distances, &MatchConfig::new(k))?;
            same_class_pairs(&preclusters)
        } else {
            Vec::new()
        };

        let model = IlpModel::formulate(&distances, k, &forbidden)?;
        model.validate()?;
        debug!(
            n,
            k,
            vars = model.var_count(),
            constraints = model.constraint_count(),
            "solving exact formulation"
        );

        let solution = solver.solve(&model, &SolverConfig::default());
        if !solution.is_solution_found() {
            return Err(Error::SolverFailed(solution.status));
        }

        let assignment = parse_assignment(&model, &solution.values)?;
        let objective = objective_value(data, &config.objective, &assignment, k)?;
        Ok(AnticlustResult {
            assignment,
            objective_value: objective,
            repetitions: 1,
            best_repetition: 0,
            passes: 0,
            swaps: 0,
        })
    }

    /// Validation shared by both paths; runs before any optimization
    /// state is built.
    fn check_input(data: &Data, config: &AnticlustConfig) -> Result<()> {
        config.validate()?;
        let n = data.len();
        if n == 0 {
            return Err(Error::invalid("no elements to assign"));
        }
        for (idx, category) in config.categories.iter().enumerate() {
            if category.len() != n {
                return Err(Error::invalid(format!(
                    "category vector {idx} has length {}, expected {n}",
                    category.len()
                )));
            }
        }
        if config.objective.requires_features() && data.features().is_none() {
            return Err(Error::invalid(format!(
                "the {} objective requires feature data, not a distance matrix",
                config.objective.name()
            )));
        }
        Ok(())
    }

    /// Folds categories and preclustering into one constraint
    /// partition. With both, preclusters are matched within merged
    /// category classes, so the nested partition honours both.
    fn resolve_constraints(
        data: &Data,
        config: &AnticlustConfig,
        k: usize,
    ) -> Result<Option<Vec<usize>>> {
        let merged = if config.categories.is_empty() {
            None
        } else {
            Some(crate::categories::merge_partitions(&config.categories)?)
        };

        if !config.preclustering {
            return Ok(merged);
        }

        let distances = data.to_distances();
        let mut match_config = MatchConfig::new(k);
        if let Some(classes) = &merged {
            match_config = match_config.with_scope(MatchScope::Within(classes.clone()));
        }
        Ok(Some(MatchRunner::run(&distances, &match_config)?))
    }
}

/// All unordered pairs drawn from the same class of `partition`.
fn same_class_pairs(partition: &[usize]) -> Vec<(usize, usize)> {
    let n = partition.len();
    let mut pairs = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            if partition[i] == partition[j] {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

#[cfg(feature = "parallel")]
fn collect_repetitions<F>(
    repetitions: usize,
    parallel: bool,
    run_repetition: F,
) -> Result<Vec<ExchangeResult>>
where
    F: Fn(usize) -> Result<ExchangeResult> + Sync,
{
    if parallel && repetitions > 1 {
        use rayon::prelude::*;
        (0..repetitions).into_par_iter().map(&run_repetition).collect()
    } else {
        (0..repetitions).map(run_repetition).collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn collect_repetitions<F>(
    repetitions: usize,
    _parallel: bool,
    run_repetition: F,
) -> Result<Vec<ExchangeResult>>
where
    F: Fn(usize) -> Result<ExchangeResult> + Sync,
{
    (0..repetitions).map(run_repetition).collect()
}
