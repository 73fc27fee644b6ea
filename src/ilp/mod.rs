//! Exact formulation boundary.
//!
//! The diversity criterion can be optimized to proven optimality by a
//! general-purpose MILP solver. This module owns the two sides of
//! that boundary (assembling the 0/1 cluster-editing program, and
//! parsing a returned solution vector back into group labels) and
//! nothing in between: the solver itself is an external collaborator
//! behind the [`IlpSolver`] trait.

mod model;
mod solver;

pub use model::{IlpModel, LinearConstraint, Sense};
pub use solver::{
    parse_assignment, EnumerationSolver, IlpSolution, IlpSolver, SolverConfig, SolverStatus,
};
