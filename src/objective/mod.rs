//! Objective functions and their incremental evaluation.
//!
//! All objectives are *maximized*: anticlustering wants groups whose
//! members are spread out internally, which makes the groups similar
//! to one another. Built-in criteria:
//!
//! - **diversity**: sum of pairwise within-group distances
//!   (cluster editing).
//! - **variance**: sum of squared element-to-centroid distances
//!   (the k-means criterion, maximized).
//! - **kplus**: variance on a mean/spread-augmented feature matrix.
//!
//! A user-supplied scoring function is supported as a fourth, opaque
//! variant without incremental-delta support.

mod evaluator;
mod kplus;
mod types;

pub use evaluator::{objective_value, CustomEval, DiversityEval, Evaluator, VarianceEval};
pub use kplus::kplus_augment;
pub use types::{Objective, ScoringFn};
