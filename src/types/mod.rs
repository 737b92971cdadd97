//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: account state, the two currency pools and their arithmetic
//! - `actor`: acting identities (owner/admin) and capabilities
//! - `request`: deposit and withdrawal request records
//! - `task`: task platforms and completion records
//! - `operation`: parsed replay operation rows
//! - `error`: error types for the rewards ledger

pub mod account;
pub mod actor;
pub mod error;
pub mod operation;
pub mod request;
pub mod task;

pub use account::{Account, AccountId, AccountStatus, Pool};
pub use actor::{role_capabilities, Actor, AdminId, AdminRole, Capability};
pub use error::LedgerError;
pub use operation::{ActorSpec, OpKind, OperationRecord};
pub use request::{
    BankDetails, DepositRequest, DepositStatus, PaymentMethod, RequestId, WithdrawRequest,
    WithdrawStatus,
};
pub use task::{Platform, TaskCompletion};
