//! Quantum board configuration parameters.

use serde::{Deserialize, Serialize};

/// Configuration for a [`QuantumBoard`](crate::QuantumBoard).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantumConfig {
    /// Upper bound on live branches. Lowest-probability branches beyond this
    /// are pruned after every mutating call.
    pub max_branches: usize,

    /// Squared-modulus threshold below which a merged branch is treated as
    /// cancelled. The default corresponds to an amplitude of 1e-12.
    pub epsilon: f64,

    /// Seed for the board's ChaCha20 stream. Same seed plus same call
    /// sequence gives the same measurement outcomes.
    pub seed: u64,
}

impl Default for QuantumConfig {
    fn default() -> Self {
        Self {
            max_branches: 64,
            epsilon: 1e-24,
            seed: 0,
        }
    }
}

impl QuantumConfig {
    /// Small branch cap and a fixed seed, for tests.
    pub fn for_testing() -> Self {
        Self {
            max_branches: 16,
            epsilon: 1e-24,
            seed: 42,
        }
    }

    /// Builder pattern: set branch cap.
    pub fn with_max_branches(mut self, max_branches: usize) -> Self {
        self.max_branches = max_branches;
        self
    }

    /// Builder pattern: set cancellation threshold.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Builder pattern: set RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = QuantumConfig::default();
        assert_eq!(config.max_branches, 64);
        assert!((config.epsilon - 1e-24).abs() < f64::EPSILON);
        assert_eq!(config.seed, 0);
    }

    #[test]
    fn test_builder_pattern() {
        let config = QuantumConfig::default()
            .with_max_branches(8)
            .with_seed(7)
            .with_epsilon(1e-12);

        assert_eq!(config.max_branches, 8);
        assert_eq!(config.seed, 7);
        assert!((config.epsilon - 1e-12).abs() < f64::EPSILON);
    }
}
