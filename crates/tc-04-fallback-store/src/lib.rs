//! # TC-04 Fallback Store
//!
//! The namespaced, persistent key/value store behind the synchronization
//! layer: one logical collection per entity kind, plus the credential
//! namespace used only in simulation mode.
//!
//! ## Purpose
//!
//! - Simulation mode: with no ledger configured, the store is the sole
//!   source of truth.
//! - Durability net: records written successfully to the ledger get an
//!   immediate, offline-readable shadow copy here.
//!
//! All operations are synchronous from the caller's point of view — no
//! network dependency. Corrupted stored data degrades to an empty
//! collection for that namespace, never an error. Read-modify-write
//! sequences go through [`FallbackStore::update`] as one atomic step so
//! interleaved writers cannot lose updates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
mod credentials;
mod errors;
mod ports;

pub use adapters::{FileStore, MemoryStore};
pub use credentials::{CredentialStore, InMemoryCredentials, PersistedCredentials};
pub use errors::StoreError;
pub use ports::{FallbackStore, FallbackStoreExt};

/// Namespace of the credential collection.
pub const CREDENTIALS_NS: &str = "credentials";

/// Namespace of the session flags collection.
pub const SESSION_NS: &str = "session";

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
