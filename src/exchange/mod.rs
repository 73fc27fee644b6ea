//! Exchange method: greedy pairwise-swap local search.
//!
//! The central heuristic. For each element in index order, the best
//! strictly-improving swap with any partner in another group is
//! committed immediately; a pass over all elements either runs once
//! (the default) or repeats to a local maximum. Constraint partitions
//! restrict partners to the same class, so class composition per
//! group is invariant once established by the initial assignment.

mod config;
mod runner;
mod types;

pub use config::ExchangeConfig;
pub use runner::{ExchangeResult, ExchangeRunner};
pub use types::{ExchangeProblem, Termination};
