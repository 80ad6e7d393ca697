//! # TrustChain Test Suite
//!
//! Unified test crate for cross-subsystem flows.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── flows.rs          # End-to-end portal flows over the sim ledger
//!     ├── reconciliation.rs # Merge, prune gating, durability net
//!     └── session.rs        # Session lifecycle through the portal facade
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p tc-tests
//!
//! # By category
//! cargo test -p tc-tests integration::
//! ```

pub mod integration;
