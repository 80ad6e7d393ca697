//! # Portal Configuration

use serde::{Deserialize, Serialize};
use tc_01_wallet_session::SessionConfig;
use tc_05_tx_orchestrator::OrchestratorConfig;

/// Configuration for the portal facade.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Wallet session settings (required chain, registration descriptor).
    pub session: SessionConfig,

    /// Transaction orchestration settings.
    pub orchestrator: OrchestratorConfig,

    /// Durability-net policy knob: cache a provisional copy of a tender
    /// whose creation timed out awaiting confirmation. The submission may
    /// still land; the next successful enumeration prunes the copy if it
    /// did not. Bids never get provisional copies.
    pub cache_timed_out_tenders: bool,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            orchestrator: OrchestratorConfig::default(),
            cache_timed_out_tenders: true,
        }
    }
}

impl PortalConfig {

    /// Create a config for testing (fast orchestrator timings).
    pub fn for_testing() -> Self {
        Self {
            session: SessionConfig::for_testing(),
            orchestrator: OrchestratorConfig::for_testing(),
            cache_timed_out_tenders: true,
        }
    }
}
