//! Solver boundary and solution parsing.
//!
//! The integer program is solved out of process by a general-purpose
//! MILP solver; this crate only hands the formulation over and reads
//! a 0/1 vector back. [`EnumerationSolver`] is a test-grade stand-in
//! that enumerates equal-size partitions exhaustively for tiny
//! instances.

use std::fmt;

use crate::error::{Error, Result};
use crate::ilp::model::IlpModel;

/// Status reported by a solver after execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolverStatus {
    /// Proven optimal solution found.
    Optimal,
    /// Feasible (but not necessarily optimal) solution found.
    Feasible,
    /// No feasible solution exists.
    Infeasible,
    /// Model is invalid or malformed.
    ModelInvalid,
    /// Solver exceeded its time limit.
    Timeout,
    /// No solution found for unknown reasons.
    Unknown,
}

impl fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SolverStatus::Optimal => "optimal",
            SolverStatus::Feasible => "feasible",
            SolverStatus::Infeasible => "infeasible",
            SolverStatus::ModelInvalid => "model invalid",
            SolverStatus::Timeout => "timeout",
            SolverStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Solver configuration. Timeout policy belongs to the solver, not
/// to the caller.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverConfig {
    /// Maximum solve time in milliseconds.
    pub time_limit_ms: i64,
    /// Number of parallel workers the solver may use.
    pub num_workers: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: 60_000,
            num_workers: 1,
        }
    }
}

/// A returned 0/1 solution.
#[derive(Debug, Clone)]
pub struct IlpSolution {
    /// Solver status.
    pub status: SolverStatus,
    /// Objective value, if a solution was found.
    pub objective_value: Option<f64>,
    /// Pair-variable values, indexed per [`IlpModel::pair_index`].
    pub values: Vec<bool>,
    /// Solve time in milliseconds.
    pub solve_time_ms: i64,
}

impl IlpSolution {
    /// Creates an empty solution with the given status.
    pub fn empty(status: SolverStatus) -> Self {
        Self {
            status,
            objective_value: None,
            values: Vec::new(),
            solve_time_ms: 0,
        }
    }

    /// Whether a usable solution was found.
    pub fn is_solution_found(&self) -> bool {
        matches!(self.status, SolverStatus::Optimal | SolverStatus::Feasible)
    }
}

/// The external-solver boundary.
///
/// Implementors wrap an out-of-process MILP solver; the call is
/// synchronous and blocks until the solver returns or gives up.
pub trait IlpSolver {
    /// Solves the model and returns a solution.
    fn solve(&self, model: &IlpModel, config: &SolverConfig) -> IlpSolution;
}

/// Parses a 0/1 pair-variable vector back into group labels.
///
/// Same-group pairs are unioned into components; components are
/// labeled `0..K` in order of their smallest member index. Rejects
/// vectors that do not describe `n_groups` groups of `group_size`
/// (a malformed solver response).
pub fn parse_assignment(model: &IlpModel, values: &[bool]) -> Result<Vec<usize>> {
    let n = model.n_elements();
    if values.len() != model.var_count() {
        return Err(Error::invalid(format!(
            "solution has {} variables, expected {}",
            values.len(),
            model.var_count()
        )));
    }

    let mut parent: Vec<usize> = (0..n).collect();
    fn find(parent: &mut Vec<usize>, mut x: usize) -> usize {
        while parent[x] != x {
            parent[x] = parent[parent[x]];
            x = parent[x];
        }
        x
    }
    for i in 0..n {
        for j in (i + 1)..n {
            if values[model.pair_index(i, j)] {
                let (a, b) = (find(&mut parent, i), find(&mut parent, j));
                if a != b {
                    parent[a.max(b)] = a.min(b);
                }
            }
        }
    }

    let mut labels = vec![usize::MAX; n];
    let mut next = 0;
    for i in 0..n {
        let root = find(&mut parent, i);
        if labels[root] == usize::MAX {
            labels[root] = next;
            next += 1;
        }
        labels[i] = labels[root];
    }

    if next != model.n_groups() {
        return Err(Error::invalid(format!(
            "solver grouping has {next} groups, expected {}",
            model.n_groups()
        )));
    }
    for g in 0..next {
        let size = labels.iter().filter(|&&l| l == g).count();
        if size != model.group_size() {
            return Err(Error::invalid(format!(
                "solver group {g} has {size} members, expected {}",
                model.group_size()
            )));
        }
    }
    Ok(labels)
}

/// Exhaustive partition enumeration for tiny instances.
///
/// Enumerates all assignments into equal-size groups (with the first
/// element pinned by symmetry breaking), honouring forbidden pairs.
/// Honest about its limits: instances above `max_elements` report
/// [`SolverStatus::Unknown`]. Not a real MILP solver.
pub struct EnumerationSolver {
    /// Largest element count the solver will attempt.
    pub max_elements: usize,
}

impl EnumerationSolver {
    pub fn new() -> Self {
        Self { max_elements: 14 }
    }
}

impl Default for EnumerationSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl IlpSolver for EnumerationSolver {
    fn solve(&self, model: &IlpModel, _config: &SolverConfig) -> IlpSolution {
        if model.validate().is_err() {
            return IlpSolution::empty(SolverStatus::ModelInvalid);
        }
        if model.n_elements() > self.max_elements {
            return IlpSolution::empty(SolverStatus::Unknown);
        }

        let start_time = std::time::Instant::now();
        let n = model.n_elements();
        let k = model.n_groups();

        let mut assignment = vec![usize::MAX; n];
        let mut counts = vec![0usize; k];
        let mut best: Option<(f64, Vec<usize>)> = None;

        search(model, 0, &mut assignment, &mut counts, 0.0, &mut best);

        let Some((objective, labels)) = best else {
            return IlpSolution::empty(SolverStatus::Infeasible);
        };

        let mut values = vec![false; model.var_count()];
        for i in 0..n {
            for j in (i + 1)..n {
                if labels[i] == labels[j] {
                    values[model.pair_index(i, j)] = true;
                }
            }
        }

        IlpSolution {
            status: SolverStatus::Optimal,
            objective_value: Some(objective),
            values,
            solve_time_ms: start_time.elapsed().as_millis() as i64,
        }
    }
}

fn search(
    model: &IlpModel,
    i: usize,
    assignment: &mut Vec<usize>,
    counts: &mut Vec<usize>,
    current: f64,
    best: &mut Option<(f64, Vec<usize>)>,
) {
    let n = model.n_elements();
    if i == n {
        if best.as_ref().is_none_or(|(b, _)| current > *b) {
            *best = Some((current, assignment.clone()));
        }
        return;
    }

    // A new group may only be opened in label order: this prunes
    // permutations of the same partition.
    let first_empty = counts.iter().position(|&c| c == 0).unwrap_or(counts.len());
    for g in 0..=first_empty.min(counts.len() - 1) {
        if counts[g] >= model.group_size() {
            continue;
        }
        if (0..i).any(|j| assignment[j] == g && model.is_forbidden(j, i)) {
            continue;
        }
        let gain: f64 = (0..i)
            .filter(|&j| assignment[j] == g)
            .map(|j| model.coefficients()[model.pair_index(j, i)])
            .sum();
        assignment[i] = g;
        counts[g] += 1;
        search(model, i + 1, assignment, counts, current + gain, best);
        counts[g] -= 1;
        assignment[i] = usize::MAX;
    }
}
