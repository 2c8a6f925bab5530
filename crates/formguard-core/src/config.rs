//! Validator configuration
//!
//! Chooses the evaluation policies and how unknown rule kinds are treated.
//! Values come from code (builder), from a deserialized document, or from
//! environment variables.

use serde::{Deserialize, Serialize};

use crate::evaluator::{EvaluationPolicy, Strictness};

/// Environment variable selecting the whole-form policy
pub const ENV_POLICY: &str = "FORMGUARD_POLICY";

/// Environment variable selecting the single-field policy
pub const ENV_LIVE_POLICY: &str = "FORMGUARD_LIVE_POLICY";

/// Environment variable enabling strict mode (`true`/`false`)
pub const ENV_STRICT: &str = "FORMGUARD_STRICT";

/// Configuration for [`FormValidator`](crate::FormValidator)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Policy for whole-form validation
    #[serde(default = "default_policy")]
    pub policy: EvaluationPolicy,
    /// Policy for single-field re-checks
    #[serde(default = "default_live_policy")]
    pub live_policy: EvaluationPolicy,
    /// Treatment of unknown rule kinds
    #[serde(default)]
    pub strictness: Strictness,
}

fn default_policy() -> EvaluationPolicy {
    EvaluationPolicy::Accumulate
}

fn default_live_policy() -> EvaluationPolicy {
    EvaluationPolicy::ShortCircuit
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            policy: default_policy(),
            live_policy: default_live_policy(),
            strictness: Strictness::Lenient,
        }
    }
}

impl ValidatorConfig {
    /// Create a new config builder
    pub fn builder() -> ValidatorConfigBuilder {
        ValidatorConfigBuilder::new()
    }

    /// Create config from environment variables, falling back to defaults
    /// for anything unset or unparsable
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            policy: lookup(ENV_POLICY)
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.policy),
            live_policy: lookup(ENV_LIVE_POLICY)
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.live_policy),
            strictness: match lookup(ENV_STRICT).and_then(|v| v.parse::<bool>().ok()) {
                Some(true) => Strictness::Strict,
                Some(false) => Strictness::Lenient,
                None => defaults.strictness,
            },
        }
    }

    pub fn is_strict(&self) -> bool {
        self.strictness == Strictness::Strict
    }
}

/// Builder for ValidatorConfig
pub struct ValidatorConfigBuilder {
    config: ValidatorConfig,
}

impl ValidatorConfigBuilder {
    /// Create a new builder with defaults
    pub fn new() -> Self {
        Self {
            config: ValidatorConfig::default(),
        }
    }

    /// Set the whole-form policy
    pub fn policy(mut self, policy: EvaluationPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    /// Set the single-field policy
    pub fn live_policy(mut self, policy: EvaluationPolicy) -> Self {
        self.config.live_policy = policy;
        self
    }

    /// Set how unknown rule kinds are treated
    pub fn strictness(mut self, strictness: Strictness) -> Self {
        self.config.strictness = strictness;
        self
    }

    /// Shorthand for strict or lenient mode
    pub fn strict(self, strict: bool) -> Self {
        self.strictness(if strict {
            Strictness::Strict
        } else {
            Strictness::Lenient
        })
    }

    /// Build the configuration
    pub fn build(self) -> ValidatorConfig {
        self.config
    }
}

impl Default for ValidatorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
