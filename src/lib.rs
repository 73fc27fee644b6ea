//! Anticlustering optimization engine.
//!
//! Assigns N elements, described by feature vectors or a pairwise
//! dissimilarity matrix, to K disjoint groups so that the *groups*
//! are as similar as possible to one another: the inverse of
//! classical clustering. Typical use is partitioning stimulus pools
//! or experimental item sets into balanced subsets.
//!
//! Components, leaves first:
//!
//! - **data**: feature / distance matrix representations with
//!   validation and self-describing detection.
//! - **objective**: diversity, variance and k-plus criteria with
//!   incremental swap deltas, plus a custom-callable fallback.
//! - **categories**: categorical constraint merging and
//!   class-balanced initial sampling.
//! - **matching**: nearest-neighbour preclustering that forbids
//!   mutually similar elements from sharing a group.
//! - **exchange**: the core greedy pairwise-swap local search.
//! - **ilp**: exact 0/1 formulation of the diversity criterion for
//!   an external MILP solver.
//! - **driver**: the entry contract: validation, constraint
//!   resolution, restarts, best-of-R selection.
//!
//! # Example
//!
//! ```
//! use anticlust::data::Data;
//! use anticlust::driver::{AnticlustConfig, AnticlustRunner, Method};
//!
//! let data = Data::from_rows(&[
//!     vec![1.0], vec![2.0], vec![3.0], vec![10.0], vec![11.0], vec![12.0],
//! ]).unwrap();
//! let config = AnticlustConfig::new(2)
//!     .with_method(Method::LocalMaximum)
//!     .with_seed(42);
//! let result = AnticlustRunner::run(&data, &config).unwrap();
//! assert_eq!(result.assignment.len(), 6);
//! ```
//!
//! Everything around the engine (reading tabular data, result
//! tables, plotting, stimulus-selection conveniences) lives in
//! consumer code: callers hand in a matrix and get back a
//! group-assignment vector.

pub mod categories;
pub mod data;
pub mod driver;
pub mod error;
pub mod exchange;
pub mod ilp;
pub mod matching;
pub mod objective;

pub use error::{Error, Result};
