//! Exchange engine configuration.

use super::types::Termination;

/// Configuration parameters for one exchange run.
///
/// # Examples
///
/// ```
/// use anticlust::exchange::{ExchangeConfig, Termination};
///
/// let config = ExchangeConfig::default()
///     .with_termination(Termination::LocalMaximum)
///     .with_seed(42);
/// assert_eq!(config.termination, Termination::LocalMaximum);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExchangeConfig {
    /// Termination mode: one pass, or iterate to a local maximum.
    pub termination: Termination,
    /// Safety cap on passes under [`Termination::LocalMaximum`].
    /// Strict-improvement acceptance converges long before this.
    pub max_passes: usize,
    /// Random seed for the initial assignment (None for random).
    pub seed: Option<u64>,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            termination: Termination::default(),
            max_passes: 1000,
            seed: None,
        }
    }
}

impl ExchangeConfig {
    /// Sets the termination mode.
    pub fn with_termination(mut self, termination: Termination) -> Self {
        self.termination = termination;
        self
    }

    /// Sets the pass cap for local-maximum runs.
    pub fn with_max_passes(mut self, n: usize) -> Self {
        self.max_passes = n;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_passes == 0 {
            return Err("max_passes must be at least 1".into());
        }
        Ok(())
    }
}
