//! # Orchestrator Configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Transaction orchestration tunables.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Bound on the confirmation wait, in milliseconds.
    pub confirmation_timeout_ms: u64,

    /// Interval between receipt polls, in milliseconds.
    pub receipt_poll_interval_ms: u64,

    /// Retries for transient transport failures during submission.
    pub submit_retries: u32,

    /// Pause between submission retries, in milliseconds.
    pub retry_backoff_ms: u64,

    /// Revert-reason substrings treated as "the desired end state already
    /// holds" and remapped to success.
    pub idempotent_conflict_reasons: Vec<String>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            confirmation_timeout_ms: 30_000,
            receipt_poll_interval_ms: 500,
            submit_retries: 2,
            retry_backoff_ms: 250,
            idempotent_conflict_reasons: vec![
                "already exists".to_string(),
                "already registered".to_string(),
            ],
        }
    }
}

impl OrchestratorConfig {
    /// Create a config for testing (smaller values).
    pub fn for_testing() -> Self {
        Self {
            confirmation_timeout_ms: 250,
            receipt_poll_interval_ms: 10,
            submit_retries: 2,
            retry_backoff_ms: 5,
            ..Self::default()
        }
    }

    /// Confirmation bound as a [`Duration`].
    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_millis(self.confirmation_timeout_ms)
    }

    /// Poll interval as a [`Duration`].
    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms)
    }

    /// Retry backoff as a [`Duration`].
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Whether a revert reason names an idempotent conflict.
    pub fn is_idempotent_conflict(&self, reason: &str) -> bool {
        let reason = reason.to_ascii_lowercase();
        self.idempotent_conflict_reasons
            .iter()
            .any(|known| reason.contains(known.as_str()))
    }
}
