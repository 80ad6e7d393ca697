//! # In-Memory Ledger
//!
//! An in-process [`LedgerRpc`] implementation backing simulation mode and
//! the test suite. It enforces the contract-side rules the portal depends
//! on: unique officer usernames, forward-only tender status transitions,
//! deadline checks on bids, and single-award semantics.
//!
//! Failure injection hooks (`set_fail_transport`, `corrupt_tender`) let
//! tests exercise the transport and decode paths.

use crate::domain::{encode_revert_reason, methods, RpcFailure};
use crate::domain::{WireBid, WireBidder, WireOfficer, WireTender};
use crate::handles::{NewBid, NewBidder, NewOfficer, NewTender};
use crate::ports::{LedgerRpc, TxReceipt};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use shared_types::{parse_address, Address, TxId};
use std::collections::{HashMap, HashSet};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Default)]
struct LedgerState {
    officers: Vec<WireOfficer>,
    tenders: Vec<WireTender>,
    bids: Vec<WireBid>,
    bidders: Vec<WireBidder>,
    admins: HashSet<Address>,
    receipts: HashMap<String, TxReceipt>,
    corrupt_tenders: HashSet<String>,
    fail_transport: bool,
    withhold_receipts: bool,
    block_number: u64,
    next_bid_seq: u64,
    now_override: Option<u64>,
}

/// In-process ledger with contract-rule enforcement.
#[derive(Default)]
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
}

impl InMemoryLedger {
    /// Empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every RPC interaction fail as unreachable.
    pub fn set_fail_transport(&self, fail: bool) {
        self.state.lock().fail_transport = fail;
    }

    /// Pin the ledger clock (seconds since epoch) for deterministic
    /// deadline checks.
    pub fn set_now_secs(&self, secs: u64) {
        self.state.lock().now_override = Some(secs);
    }

    /// Make reads of the given tender return an undecodable record.
    pub fn corrupt_tender(&self, id: &str) {
        self.state.lock().corrupt_tenders.insert(id.to_string());
    }

    /// Withhold confirmations: writes still apply, but receipt polls
    /// return nothing until released. Models slow confirmation.
    pub fn set_withhold_receipts(&self, withhold: bool) {
        self.state.lock().withhold_receipts = withhold;
    }

    /// Grant the admin role to an address.
    pub fn add_admin(&self, address: Address) {
        self.state.lock().admins.insert(address);
    }

    /// Seed a tender directly, bypassing validation.
    pub fn seed_tender(&self, tender: WireTender) {
        self.state.lock().tenders.push(tender);
    }

    /// Seed an officer directly, bypassing validation.
    pub fn seed_officer(&self, officer: WireOfficer) {
        self.state.lock().officers.push(officer);
    }

    fn now_secs(state: &LedgerState) -> u64 {
        state.now_override.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0)
        })
    }

    fn parse_one_address(params: &[Value]) -> Result<Address, RpcFailure> {
        params
            .first()
            .and_then(Value::as_str)
            .and_then(parse_address)
            .ok_or_else(|| RpcFailure::Transport("malformed address parameter".to_string()))
    }

    fn parse_one_str(params: &[Value]) -> Result<&str, RpcFailure> {
        params
            .first()
            .and_then(Value::as_str)
            .ok_or_else(|| RpcFailure::Transport("malformed string parameter".to_string()))
    }

    fn parse_input<T: serde::de::DeserializeOwned>(params: &[Value]) -> Result<T, RpcFailure> {
        let value = params
            .first()
            .cloned()
            .ok_or_else(|| RpcFailure::Transport("missing input parameter".to_string()))?;
        serde_json::from_value(value)
            .map_err(|e| RpcFailure::Transport(format!("malformed input parameter: {e}")))
    }

    /// Apply a write. `Err(reason)` becomes an encoded revert.
    fn apply(
        state: &mut LedgerState,
        method: &str,
        params: &[Value],
        from: Address,
    ) -> Result<(), ApplyError> {
        match method {
            methods::officer::ADD => {
                let input: NewOfficer = Self::parse_input(params)?;
                let duplicate = state.officers.iter().any(|o| {
                    o.username == input.username || o.wallet_address == input.wallet_address
                });
                if duplicate {
                    return Err("officer already exists".into());
                }
                let now = Self::now_secs(state);
                state.officers.push(WireOfficer {
                    id: input.id,
                    wallet_address: input.wallet_address,
                    name: input.name,
                    username: input.username,
                    email: input.email,
                    is_active: true,
                    can_create: true,
                    can_approve: true,
                    created_at: now,
                });
                Ok(())
            }
            methods::officer::UPDATE => {
                let address = Self::parse_one_address(params)?;
                let (name, username, email) = match params {
                    [_, n, u, e] => (
                        n.as_str().unwrap_or_default().to_string(),
                        u.as_str().unwrap_or_default().to_string(),
                        e.as_str().unwrap_or_default().to_string(),
                    ),
                    _ => return Err(ApplyError::Malformed("updateOfficer params".to_string())),
                };
                let taken = state
                    .officers
                    .iter()
                    .any(|o| o.username == username && o.wallet_address != address);
                if taken {
                    return Err("username already taken".into());
                }
                let officer = state
                    .officers
                    .iter_mut()
                    .find(|o| o.wallet_address == address)
                    .ok_or("officer not found")?;
                officer.name = name;
                officer.username = username;
                officer.email = email;
                Ok(())
            }
            methods::officer::REMOVE => {
                let address = Self::parse_one_address(params)?;
                let officer = state
                    .officers
                    .iter_mut()
                    .find(|o| o.wallet_address == address)
                    .ok_or("officer not found")?;
                // Logical deactivation; the record stays enumerable.
                officer.is_active = false;
                Ok(())
            }
            methods::tender::CREATE => {
                let input: NewTender = Self::parse_input(params)?;
                if state.tenders.iter().any(|t| t.id == input.id) {
                    return Err("tender already exists".into());
                }
                if input.start_date >= input.end_date {
                    return Err("invalid tender window".into());
                }
                let now = Self::now_secs(state);
                state.tenders.push(WireTender {
                    id: input.id,
                    title: input.title,
                    description: input.description,
                    budget: input.budget,
                    start_date: input.start_date,
                    end_date: input.end_date,
                    creator: from,
                    status: 0,
                    department: input.department,
                    category: input.category,
                    location: input.location,
                    criteria: input.criteria,
                    documents: input.documents,
                    bid_count: 0,
                    winner: None,
                    created_at: now,
                });
                Ok(())
            }
            methods::tender::CLOSE => {
                let id = Self::parse_one_str(params)?;
                let tender = state
                    .tenders
                    .iter_mut()
                    .find(|t| t.id == id)
                    .ok_or("tender not found")?;
                if tender.status != 0 {
                    return Err("tender is not open".into());
                }
                tender.status = 1;
                Ok(())
            }
            methods::tender::DISPUTE => {
                let id = Self::parse_one_str(params)?;
                let tender = state
                    .tenders
                    .iter_mut()
                    .find(|t| t.id == id)
                    .ok_or("tender not found")?;
                if tender.status != 0 {
                    return Err("tender is not open".into());
                }
                tender.status = 3;
                Ok(())
            }
            methods::tender::AWARD => {
                let (tender_id, bid_id) = match params {
                    [t, b] => (
                        t.as_str().unwrap_or_default().to_string(),
                        b.as_str().unwrap_or_default().to_string(),
                    ),
                    _ => return Err(ApplyError::Malformed("awardTender params".to_string())),
                };
                let belongs = state
                    .bids
                    .iter()
                    .any(|b| b.id == bid_id && b.tender_id == tender_id);
                if !belongs {
                    return Err("bid does not belong to tender".into());
                }
                let tender = state
                    .tenders
                    .iter_mut()
                    .find(|t| t.id == tender_id)
                    .ok_or("tender not found")?;
                if tender.status != 1 {
                    return Err("tender is not closed".into());
                }
                tender.status = 2;
                tender.winner = Some(bid_id.clone());
                for bid in state.bids.iter_mut().filter(|b| b.tender_id == tender_id) {
                    if bid.id == bid_id {
                        bid.status = 1; // accepted, exactly once per tender
                    } else if bid.status == 0 {
                        bid.status = 2; // pending losers are rejected
                    }
                }
                Ok(())
            }
            methods::tender::SUBMIT_BID => {
                let input: NewBid = Self::parse_input(params)?;
                let now = Self::now_secs(state);
                let tender = state
                    .tenders
                    .iter_mut()
                    .find(|t| t.id == input.tender_id)
                    .ok_or("tender not found")?;
                if tender.status != 0 {
                    return Err("tender is not open".into());
                }
                if now >= tender.end_date {
                    return Err("tender deadline has passed".into());
                }
                tender.bid_count += 1;
                state.next_bid_seq += 1;
                state.bids.push(WireBid {
                    id: format!("bid-{}", state.next_bid_seq),
                    tender_id: input.tender_id,
                    bidder: from,
                    amount: input.amount,
                    description: input.description,
                    status: 0,
                    created_at: now,
                });
                Ok(())
            }
            methods::user::REGISTER => {
                let input: NewBidder = Self::parse_input(params)?;
                let duplicate = state
                    .bidders
                    .iter()
                    .any(|b| b.wallet_address == from || b.username == input.username);
                if duplicate {
                    return Err("user already registered".into());
                }
                let now = Self::now_secs(state);
                state.bidders.push(WireBidder {
                    wallet_address: from,
                    name: input.name,
                    username: input.username,
                    email: input.email,
                    company: input.company,
                    is_approved: false,
                    approval_remark: String::new(),
                    created_at: now,
                });
                Ok(())
            }
            methods::user::SET_APPROVAL => {
                let address = Self::parse_one_address(params)?;
                let (approved, remark) = match params {
                    [_, a, r] => (
                        a.as_bool().unwrap_or(false),
                        r.as_str().unwrap_or_default().to_string(),
                    ),
                    _ => return Err(ApplyError::Malformed("setUserApproval params".to_string())),
                };
                let bidder = state
                    .bidders
                    .iter_mut()
                    .find(|b| b.wallet_address == address)
                    .ok_or("user not found")?;
                bidder.is_approved = approved;
                bidder.approval_remark = remark;
                Ok(())
            }
            other => Err(ApplyError::Malformed(format!("unknown method {other}"))),
        }
    }
}

/// Outcome of a failed write application.
enum ApplyError {
    /// Contract-rule violation; becomes an encoded revert.
    Revert(String),
    /// Params the handles would never produce; surfaces as transport.
    Malformed(String),
}

impl From<&str> for ApplyError {
    fn from(reason: &str) -> Self {
        ApplyError::Revert(reason.to_string())
    }
}

impl From<RpcFailure> for ApplyError {
    fn from(e: RpcFailure) -> Self {
        ApplyError::Malformed(e.to_string())
    }
}

#[async_trait]
impl LedgerRpc for InMemoryLedger {
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcFailure> {
        let state = self.state.lock();
        if state.fail_transport {
            return Err(RpcFailure::Transport("connection refused".to_string()));
        }

        let to_json = |r: Result<Value, serde_json::Error>| {
            r.map_err(|e| RpcFailure::Transport(format!("encode response: {e}")))
        };

        match method {
            methods::officer::GET => {
                let address = Self::parse_one_address(&params)?;
                let officer = state
                    .officers
                    .iter()
                    .find(|o| o.wallet_address == address);
                to_json(serde_json::to_value(officer))
            }
            methods::officer::LIST_ADDRESSES => {
                let addresses: Vec<Address> =
                    state.officers.iter().map(|o| o.wallet_address).collect();
                to_json(serde_json::to_value(addresses))
            }
            methods::officer::IS_OFFICER => {
                let address = Self::parse_one_address(&params)?;
                let is_officer = state
                    .officers
                    .iter()
                    .any(|o| o.wallet_address == address && o.is_active);
                Ok(json!(is_officer))
            }
            methods::tender::GET => {
                let id = Self::parse_one_str(&params)?;
                if state.corrupt_tenders.contains(id) {
                    // Shape a record the wire decoder cannot accept.
                    return Ok(json!({ "id": 42, "title": null }));
                }
                let tender = state.tenders.iter().find(|t| t.id == id);
                to_json(serde_json::to_value(tender))
            }
            methods::tender::LIST_IDS => {
                let ids: Vec<&str> = state.tenders.iter().map(|t| t.id.as_str()).collect();
                to_json(serde_json::to_value(ids))
            }
            methods::tender::GET_BID => {
                let id = Self::parse_one_str(&params)?;
                let bid = state.bids.iter().find(|b| b.id == id);
                to_json(serde_json::to_value(bid))
            }
            methods::tender::LIST_BID_IDS => {
                let tender_id = Self::parse_one_str(&params)?;
                let ids: Vec<&str> = state
                    .bids
                    .iter()
                    .filter(|b| b.tender_id == tender_id)
                    .map(|b| b.id.as_str())
                    .collect();
                to_json(serde_json::to_value(ids))
            }
            methods::user::GET => {
                let address = Self::parse_one_address(&params)?;
                let bidder = state.bidders.iter().find(|b| b.wallet_address == address);
                to_json(serde_json::to_value(bidder))
            }
            methods::user::IS_ADMIN => {
                let address = Self::parse_one_address(&params)?;
                Ok(json!(state.admins.contains(&address)))
            }
            other => Err(RpcFailure::Transport(format!("unknown method {other}"))),
        }
    }

    async fn submit(
        &self,
        method: &str,
        params: Vec<Value>,
        from: Address,
    ) -> Result<TxId, RpcFailure> {
        let mut state = self.state.lock();
        if state.fail_transport {
            return Err(RpcFailure::Transport("connection refused".to_string()));
        }

        match Self::apply(&mut state, method, &params, from) {
            Ok(()) => {
                state.block_number += 1;
                let block_number = state.block_number;
                let tx_id = TxId(format!("0x{}", uuid::Uuid::new_v4().simple()));
                state.receipts.insert(
                    tx_id.0.clone(),
                    TxReceipt {
                        tx_id: tx_id.clone(),
                        success: true,
                        revert_data: None,
                        block_number,
                    },
                );
                Ok(tx_id)
            }
            Err(ApplyError::Revert(reason)) => {
                tracing::debug!(method, %reason, "simulated write reverted");
                Err(RpcFailure::Reverted {
                    data: Some(encode_revert_reason(&reason)),
                })
            }
            Err(ApplyError::Malformed(msg)) => Err(RpcFailure::Transport(msg)),
        }
    }

    async fn receipt(&self, tx_id: &TxId) -> Result<Option<TxReceipt>, RpcFailure> {
        let state = self.state.lock();
        if state.fail_transport {
            return Err(RpcFailure::Transport("connection refused".to_string()));
        }
        if state.withhold_receipts {
            return Ok(None);
        }
        Ok(state.receipts.get(&tx_id.0).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::decode_revert_reason;
    use shared_types::U256;

    fn addr(n: u64) -> Address {
        Address::from_low_u64_be(n)
    }

    fn open_tender(id: &str, end_date: u64) -> WireTender {
        WireTender {
            id: id.to_string(),
            title: "Test tender".into(),
            description: "".into(),
            budget: U256::from(1_000u64),
            start_date: 100,
            end_date,
            creator: addr(1),
            status: 0,
            department: "Works".into(),
            category: "General".into(),
            location: "".into(),
            criteria: vec![],
            documents: vec![],
            bid_count: 0,
            winner: None,
            created_at: 100,
        }
    }

    fn revert_reason(failure: RpcFailure) -> String {
        match failure {
            RpcFailure::Reverted { data } => {
                decode_revert_reason(&data.unwrap()).unwrap()
            }
            other => panic!("expected revert, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_duplicate_officer_reverts_with_already_exists() {
        let ledger = InMemoryLedger::new();
        let input = NewOfficer {
            wallet_address: addr(1),
            id: "officer-1".into(),
            name: "A".into(),
            username: "a".into(),
            email: "a@example.org".into(),
        };
        let params = vec![serde_json::to_value(&input).unwrap()];
        ledger
            .submit(methods::officer::ADD, params.clone(), addr(9))
            .await
            .unwrap();

        let failure = ledger
            .submit(methods::officer::ADD, params, addr(9))
            .await
            .unwrap_err();
        assert_eq!(revert_reason(failure), "officer already exists");
    }

    #[tokio::test]
    async fn test_bid_against_closed_tender_reverts() {
        let ledger = InMemoryLedger::new();
        ledger.set_now_secs(500);
        let mut tender = open_tender("tender-7", 1_000);
        tender.status = 1;
        ledger.seed_tender(tender);

        let input = NewBid {
            tender_id: "tender-7".into(),
            amount: U256::from(10u64),
            description: "x".into(),
        };
        let failure = ledger
            .submit(
                methods::tender::SUBMIT_BID,
                vec![serde_json::to_value(&input).unwrap()],
                addr(5),
            )
            .await
            .unwrap_err();
        assert_eq!(revert_reason(failure), "tender is not open");
    }

    #[tokio::test]
    async fn test_bid_after_deadline_reverts() {
        let ledger = InMemoryLedger::new();
        ledger.set_now_secs(2_000);
        ledger.seed_tender(open_tender("tender-7", 1_000));

        let input = NewBid {
            tender_id: "tender-7".into(),
            amount: U256::from(10u64),
            description: "x".into(),
        };
        let failure = ledger
            .submit(
                methods::tender::SUBMIT_BID,
                vec![serde_json::to_value(&input).unwrap()],
                addr(5),
            )
            .await
            .unwrap_err();
        assert_eq!(revert_reason(failure), "tender deadline has passed");
    }

    #[tokio::test]
    async fn test_award_flow_accepts_one_rejects_rest() {
        let ledger = InMemoryLedger::new();
        ledger.set_now_secs(500);
        ledger.seed_tender(open_tender("tender-1", 1_000));

        for (bidder, amount) in [(5u64, 10u64), (6, 20)] {
            let input = NewBid {
                tender_id: "tender-1".into(),
                amount: U256::from(amount),
                description: "".into(),
            };
            ledger
                .submit(
                    methods::tender::SUBMIT_BID,
                    vec![serde_json::to_value(&input).unwrap()],
                    addr(bidder),
                )
                .await
                .unwrap();
        }

        ledger
            .submit(methods::tender::CLOSE, vec![json!("tender-1")], addr(1))
            .await
            .unwrap();
        ledger
            .submit(
                methods::tender::AWARD,
                vec![json!("tender-1"), json!("bid-1")],
                addr(1),
            )
            .await
            .unwrap();

        let tender: WireTender = serde_json::from_value(
            ledger
                .call(methods::tender::GET, vec![json!("tender-1")])
                .await
                .unwrap(),
        )
        .unwrap();
        assert_eq!(tender.status, 2);
        assert_eq!(tender.winner.as_deref(), Some("bid-1"));

        let winner: WireBid = serde_json::from_value(
            ledger
                .call(methods::tender::GET_BID, vec![json!("bid-1")])
                .await
                .unwrap(),
        )
        .unwrap();
        let loser: WireBid = serde_json::from_value(
            ledger
                .call(methods::tender::GET_BID, vec![json!("bid-2")])
                .await
                .unwrap(),
        )
        .unwrap();
        assert_eq!(winner.status, 1);
        assert_eq!(loser.status, 2);
    }

    #[tokio::test]
    async fn test_award_requires_closed_tender() {
        let ledger = InMemoryLedger::new();
        ledger.set_now_secs(500);
        ledger.seed_tender(open_tender("tender-1", 1_000));
        let input = NewBid {
            tender_id: "tender-1".into(),
            amount: U256::from(10u64),
            description: "".into(),
        };
        ledger
            .submit(
                methods::tender::SUBMIT_BID,
                vec![serde_json::to_value(&input).unwrap()],
                addr(5),
            )
            .await
            .unwrap();

        let failure = ledger
            .submit(
                methods::tender::AWARD,
                vec![json!("tender-1"), json!("bid-1")],
                addr(1),
            )
            .await
            .unwrap_err();
        assert_eq!(revert_reason(failure), "tender is not closed");
    }

    #[tokio::test]
    async fn test_status_never_moves_backward() {
        let ledger = InMemoryLedger::new();
        ledger.seed_tender(open_tender("tender-1", 1_000));
        ledger
            .submit(methods::tender::CLOSE, vec![json!("tender-1")], addr(1))
            .await
            .unwrap();

        // A closed tender cannot be closed or disputed again.
        let failure = ledger
            .submit(methods::tender::CLOSE, vec![json!("tender-1")], addr(1))
            .await
            .unwrap_err();
        assert_eq!(revert_reason(failure), "tender is not open");
        let failure = ledger
            .submit(methods::tender::DISPUTE, vec![json!("tender-1")], addr(1))
            .await
            .unwrap_err();
        assert_eq!(revert_reason(failure), "tender is not open");
    }

    #[tokio::test]
    async fn test_corrupt_tender_read_does_not_decode() {
        let ledger = InMemoryLedger::new();
        ledger.seed_tender(open_tender("tender-1", 1_000));
        ledger.corrupt_tender("tender-1");

        let value = ledger
            .call(methods::tender::GET, vec![json!("tender-1")])
            .await
            .unwrap();
        assert!(serde_json::from_value::<WireTender>(value).is_err());
    }

    #[tokio::test]
    async fn test_transport_failure_injection() {
        let ledger = InMemoryLedger::new();
        ledger.set_fail_transport(true);
        let failure = ledger
            .call(methods::tender::LIST_IDS, vec![])
            .await
            .unwrap_err();
        assert!(matches!(failure, RpcFailure::Transport(_)));
    }

    #[tokio::test]
    async fn test_successful_submit_has_receipt() {
        let ledger = InMemoryLedger::new();
        let input = NewOfficer {
            wallet_address: addr(1),
            id: "officer-1".into(),
            name: "A".into(),
            username: "a".into(),
            email: "a@example.org".into(),
        };
        let tx_id = ledger
            .submit(
                methods::officer::ADD,
                vec![serde_json::to_value(&input).unwrap()],
                addr(9),
            )
            .await
            .unwrap();
        let receipt = ledger.receipt(&tx_id).await.unwrap().unwrap();
        assert!(receipt.success);
        assert_eq!(receipt.tx_id, tx_id);
    }

    #[tokio::test]
    async fn test_remove_officer_is_logical_deactivation() {
        let ledger = InMemoryLedger::new();
        let input = NewOfficer {
            wallet_address: addr(1),
            id: "officer-1".into(),
            name: "A".into(),
            username: "a".into(),
            email: "a@example.org".into(),
        };
        ledger
            .submit(
                methods::officer::ADD,
                vec![serde_json::to_value(&input).unwrap()],
                addr(9),
            )
            .await
            .unwrap();
        ledger
            .submit(
                methods::officer::REMOVE,
                vec![json!(shared_types::address_hex(&addr(1)))],
                addr(9),
            )
            .await
            .unwrap();

        // Still enumerable, no longer active.
        let addresses: Vec<Address> = serde_json::from_value(
            ledger
                .call(methods::officer::LIST_ADDRESSES, vec![])
                .await
                .unwrap(),
        )
        .unwrap();
        assert_eq!(addresses, vec![addr(1)]);
        let officer: WireOfficer = serde_json::from_value(
            ledger
                .call(
                    methods::officer::GET,
                    vec![json!(shared_types::address_hex(&addr(1)))],
                )
                .await
                .unwrap(),
        )
        .unwrap();
        assert!(!officer.is_active);
    }
}
