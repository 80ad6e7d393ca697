//! Ports: the RPC channel trait and the pending-transaction handle writes
//! hand back.

mod rpc;

pub use rpc::{LedgerRpc, PendingTx, TxReceipt};
