use facegate_core::DEFAULT_MATCH_THRESHOLD;
use std::time::Duration;

/// Period of the presence monitor when not overridden.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Orchestrator configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthConfig {
    /// Period between presence monitor samples.
    pub poll_interval: Duration,
    /// Maximum descriptor distance accepted by the match index.
    pub match_threshold: f32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }
}

impl AuthConfig {
    /// Load configuration from `FACEGATE_*` environment variables with defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let poll_interval = lookup("FACEGATE_POLL_INTERVAL_MS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&ms| ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(defaults.poll_interval);

        let match_threshold = lookup("FACEGATE_MATCH_THRESHOLD")
            .and_then(|v| v.parse::<f32>().ok())
            .filter(|t| t.is_finite() && *t > 0.0)
            .unwrap_or(defaults.match_threshold);

        Self {
            poll_interval,
            match_threshold,
        }
    }
}
