//! Domain types for the wallet session.

mod connection;

pub use connection::{ChainDescriptor, Connection, ConnectionStatus, NativeCurrency, SessionState};
