//! # Remote Method Names
//!
//! The method vocabulary of the RPC channel, one constant per remote
//! operation, grouped by service.

/// Officer registry methods.
pub mod officer {
    /// Add an officer (write).
    pub const ADD: &str = "addOfficer";
    /// Update an officer's name/contact fields (write).
    pub const UPDATE: &str = "updateOfficer";
    /// Logically deactivate an officer (write).
    pub const REMOVE: &str = "removeOfficer";
    /// Fetch one officer by wallet address (read).
    pub const GET: &str = "getOfficer";
    /// Enumerate all officer addresses (read).
    pub const LIST_ADDRESSES: &str = "getAllOfficerAddresses";
    /// Membership check (read).
    pub const IS_OFFICER: &str = "isOfficer";
}

/// Tender registry methods.
pub mod tender {
    /// Create a tender (write).
    pub const CREATE: &str = "createTender";
    /// Close an open tender (write).
    pub const CLOSE: &str = "closeTender";
    /// Award a closed tender to a bid (write).
    pub const AWARD: &str = "awardTender";
    /// Dispute an open tender (write).
    pub const DISPUTE: &str = "disputeTender";
    /// Fetch one tender by id (read).
    pub const GET: &str = "getTender";
    /// Enumerate all tender ids (read).
    pub const LIST_IDS: &str = "getAllTenderIds";
    /// Submit a bid against a tender (write).
    pub const SUBMIT_BID: &str = "submitBid";
    /// Fetch one bid by id (read).
    pub const GET_BID: &str = "getBid";
    /// Enumerate bid ids scoped to one tender (read).
    pub const LIST_BID_IDS: &str = "getTenderBidIds";
}

/// User registry methods.
pub mod user {
    /// Register a bidder profile (write).
    pub const REGISTER: &str = "registerUser";
    /// Approve or reject a registered bidder (write).
    pub const SET_APPROVAL: &str = "setUserApproval";
    /// Fetch one bidder profile by wallet address (read).
    pub const GET: &str = "getUser";
    /// Admin check (read).
    pub const IS_ADMIN: &str = "isAdmin";
}
