//! Entry point and restart/repetition driver.
//!
//! One invocation: validate input, resolve categorical and
//! preclustering constraints into a single partition, then run the
//! requested method. Heuristic methods restart from R independent
//! random initial assignments and keep the best final objective;
//! the exact method hands a 0/1 formulation to an external solver.

mod config;
mod runner;

pub use config::{AnticlustConfig, GroupSpec, Method};
pub use runner::{AnticlustResult, AnticlustRunner};
