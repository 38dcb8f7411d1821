use std::env;
use tracing::{info, warn};

use crate::services::classifier::FitnessPolicy;

/// Domain-level settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DomainConfig {
    /// Rule set applied to new submissions
    pub fitness_policy: FitnessPolicy,
}

impl DomainConfig {
    /// Read settings from `HEALTHLOG_FITNESS_POLICY`.
    ///
    /// An unrecognised policy name falls back to the default with a warning.
    pub fn from_env() -> Self {
        let fitness_policy = match env::var("HEALTHLOG_FITNESS_POLICY") {
            Ok(value) => Self::parse_policy(&value),
            Err(_) => FitnessPolicy::default(),
        };

        info!("Fitness policy: {}", fitness_policy);
        Self { fitness_policy }
    }

    fn parse_policy(value: &str) -> FitnessPolicy {
        value.parse().unwrap_or_else(|e| {
            warn!("{}; using {}", e, FitnessPolicy::default());
            FitnessPolicy::default()
        })
    }

    /// Replace the policy, e.g. from a command-line flag
    pub fn with_policy(mut self, policy: Option<FitnessPolicy>) -> Self {
        if let Some(policy) = policy {
            self.fitness_policy = policy;
        }
        self
    }
}
