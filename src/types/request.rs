//! Deposit and withdrawal request records
//!
//! Requests are append-mostly audit entries: they are created `pending`,
//! transition exactly once into a terminal state, and keep the timestamps
//! and actor references of every transition. Their state changes are the
//! only permitted trigger for ledger mutation.

use super::account::AccountId;
use super::actor::AdminId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Request identifier shared by deposit and withdrawal requests
///
/// Assigned sequentially from a single sequence, so a request ID is unique
/// across both request kinds.
pub type RequestId = u64;

/// How the user intends to pay a deposit
///
/// Informational only; no workflow logic branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Manual bank transfer
    #[default]
    BankTransfer,
    /// QR-code initiated transfer
    QrCode,
    /// Card payment
    Card,
    /// E-wallet payment
    Wallet,
}

/// States of a deposit request
///
/// `Pending` is the only non-terminal state; every transition out of it is
/// final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepositStatus {
    /// Awaiting an admin decision
    Pending,
    /// Approved by an admin; the ledger credit has been applied
    Completed,
    /// Rejected by an admin; the ledger was never credited
    Failed,
    /// Cancelled by the owning user before any admin decision
    Cancelled,
}

impl fmt::Display for DepositStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DepositStatus::Pending => "pending",
            DepositStatus::Completed => "completed",
            DepositStatus::Failed => "failed",
            DepositStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

/// States of a withdrawal request
///
/// The success path is `Pending -> Processing -> Completed`. `Failed` is
/// reachable from both non-terminal states, `Cancelled` only from `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawStatus {
    /// Awaiting an admin decision
    Pending,
    /// Approved; an admin is executing the transfer out-of-band
    Processing,
    /// The external transfer is confirmed done
    Completed,
    /// Rejected by an admin; the amount was refunded to the ledger
    Failed,
    /// Cancelled by the owning user while still pending
    Cancelled,
}

impl WithdrawStatus {
    /// Whether no further transition is possible from this state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WithdrawStatus::Completed | WithdrawStatus::Failed | WithdrawStatus::Cancelled
        )
    }
}

impl fmt::Display for WithdrawStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WithdrawStatus::Pending => "pending",
            WithdrawStatus::Processing => "processing",
            WithdrawStatus::Completed => "completed",
            WithdrawStatus::Failed => "failed",
            WithdrawStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

/// Destination bank coordinates for a withdrawal
///
/// Opaque to the ledger: the fields are stored and echoed back, never
/// validated or interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BankDetails {
    /// Receiving bank name
    pub bank_name: String,
    /// Receiving account number
    pub account_number: String,
    /// Name the receiving account is held under
    pub account_holder: String,
    /// Branch, where the bank requires one
    pub branch: String,
}

impl BankDetails {
    /// Create bank details from the raw strings supplied by the user
    pub fn new(
        bank_name: impl Into<String>,
        account_number: impl Into<String>,
        account_holder: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        BankDetails {
            bank_name: bank_name.into(),
            account_number: account_number.into(),
            account_holder: account_holder.into(),
            branch: branch.into(),
        }
    }
}

/// A deposit request and its audit trail
#[derive(Debug, Clone, PartialEq)]
pub struct DepositRequest {
    /// Request ID
    pub id: RequestId,

    /// Account the deposit belongs to
    pub account: AccountId,

    /// Deposit amount; at least the configured minimum at creation time
    pub amount: Decimal,

    /// Payment method announced by the user
    pub method: PaymentMethod,

    /// Current state
    pub status: DepositStatus,

    /// Creation instant
    pub created_at: DateTime<Utc>,

    /// When the request was approved
    pub approved_at: Option<DateTime<Utc>>,

    /// Admin who approved the request
    pub approved_by: Option<AdminId>,

    /// When the request was rejected
    pub rejected_at: Option<DateTime<Utc>>,

    /// Admin who rejected the request
    pub rejected_by: Option<AdminId>,

    /// Mandatory reason recorded on rejection
    pub rejection_reason: Option<String>,
}

impl DepositRequest {
    /// Create a new pending deposit request
    pub fn new(
        id: RequestId,
        account: AccountId,
        amount: Decimal,
        method: PaymentMethod,
        created_at: DateTime<Utc>,
    ) -> Self {
        DepositRequest {
            id,
            account,
            amount,
            method,
            status: DepositStatus::Pending,
            created_at,
            approved_at: None,
            approved_by: None,
            rejected_at: None,
            rejected_by: None,
            rejection_reason: None,
        }
    }
}

/// A withdrawal request and its audit trail
#[derive(Debug, Clone, PartialEq)]
pub struct WithdrawRequest {
    /// Request ID
    pub id: RequestId,

    /// Account the withdrawal debits
    pub account: AccountId,

    /// Withdrawal amount; within the configured window at creation time
    ///
    /// The amount is validated against the account's holdings only at
    /// creation. Nothing is reserved: several pending withdrawals may
    /// jointly exceed the balance.
    pub amount: Decimal,

    /// Destination bank coordinates
    pub bank: BankDetails,

    /// Current state
    pub status: WithdrawStatus,

    /// Creation instant
    pub created_at: DateTime<Utc>,

    /// When the request moved to processing
    pub approved_at: Option<DateTime<Utc>>,

    /// Admin who moved the request to processing
    pub approved_by: Option<AdminId>,

    /// When the external transfer was confirmed
    pub completed_at: Option<DateTime<Utc>>,

    /// Admin who confirmed the external transfer
    pub processed_by: Option<AdminId>,

    /// Identifier of the external transfer, as reported by the admin
    pub external_txn: Option<String>,

    /// When the request was rejected
    pub rejected_at: Option<DateTime<Utc>>,

    /// Admin who rejected the request
    pub rejected_by: Option<AdminId>,

    /// Mandatory reason recorded on rejection
    pub rejection_reason: Option<String>,
}

impl WithdrawRequest {
    /// Create a new pending withdrawal request
    pub fn new(
        id: RequestId,
        account: AccountId,
        amount: Decimal,
        bank: BankDetails,
        created_at: DateTime<Utc>,
    ) -> Self {
        WithdrawRequest {
            id,
            account,
            amount,
            bank,
            status: WithdrawStatus::Pending,
            created_at,
            approved_at: None,
            approved_by: None,
            completed_at: None,
            processed_by: None,
            external_txn: None,
            rejected_at: None,
            rejected_by: None,
            rejection_reason: None,
        }
    }
}
