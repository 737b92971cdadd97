//! Error types for the rewards ledger
//!
//! This module defines all error types that can occur while driving the
//! ledger and its workflows. Every workflow operation returns a typed error
//! instead of silently no-op'ing; callers translate to user-facing messages.
//!
//! # Error Categories
//!
//! - **Business-rule errors**: insufficient funds, amount limits, illegal
//!   state transitions, cooldowns, authorization
//! - **File I/O errors**: file not found, permission denied, etc.
//! - **CSV Parsing Errors**: malformed rows in the replay input
//! - **Arithmetic Errors**: overflow, underflow in pool calculations

use super::account::AccountId;
use super::request::RequestId;
use super::task::Platform;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the rewards ledger
///
/// All variants are recoverable at the caller: a rejected operation leaves
/// the ledger untouched and the process keeps running. Each variant carries
/// the context needed to diagnose the rejection.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Total holdings are too small for the requested debit or withdrawal
    #[error(
        "Insufficient funds for account {account}: available {available}, requested {requested}"
    )]
    InsufficientFunds {
        /// Account ID
        account: AccountId,
        /// Total holdings across both pools at check time
        available: Decimal,
        /// Requested amount
        requested: Decimal,
    },

    /// Amount is below the configured minimum (deposit creation)
    #[error("Amount {amount} is below the minimum of {minimum}")]
    AmountTooLow {
        /// Requested amount
        amount: Decimal,
        /// Configured minimum
        minimum: Decimal,
    },

    /// Amount falls outside the configured window (withdrawal creation)
    #[error("Amount {amount} is outside the allowed range {min}..={max}")]
    AmountOutOfRange {
        /// Requested amount
        amount: Decimal,
        /// Lower bound of the window
        min: Decimal,
        /// Upper bound of the window
        max: Decimal,
    },

    /// The account has not deposited enough to unlock withdrawals
    #[error("Deposited total {deposited} is below the withdrawal threshold of {required}")]
    DepositThresholdNotMet {
        /// Cumulative completed deposits on the account
        deposited: Decimal,
        /// Configured threshold
        required: Decimal,
    },

    /// A transition was attempted from a state that does not allow it
    #[error("Request {request} cannot transition from state '{current}'")]
    InvalidState {
        /// Request ID
        request: RequestId,
        /// The state the request was actually in
        current: String,
    },

    /// A rejection was attempted without a reason
    #[error("A rejection reason is required for request {request}")]
    MissingReason {
        /// Request ID
        request: RequestId,
    },

    /// The account's level does not unlock the requested task level
    #[error("Account {account} is level {level} but the task requires level {required}")]
    LevelTooLow {
        /// Account ID
        account: AccountId,
        /// Current account level
        level: u8,
        /// Level demanded by the task
        required: u8,
    },

    /// The per-(platform, level) task cooldown has not elapsed
    #[error("Task on {platform} at level {level} for account {account} is on cooldown until {next_eligible}")]
    CooldownActive {
        /// Account ID
        account: AccountId,
        /// Task platform
        platform: Platform,
        /// Task level
        level: u8,
        /// Instant at which the task becomes available again
        next_eligible: DateTime<Utc>,
    },

    /// No account exists under the given ID
    #[error("Account {account} not found")]
    AccountNotFound {
        /// Account ID that was not found
        account: AccountId,
    },

    /// No deposit or withdrawal request exists under the given ID
    #[error("Request {request} not found")]
    RequestNotFound {
        /// Request ID that was not found
        request: RequestId,
    },

    /// The acting identity lacks rights over the target record
    #[error("Actor is not permitted to {action}")]
    Unauthorized {
        /// Description of the refused action
        action: String,
    },

    /// Amount is zero or negative where a positive amount is required
    #[error("Amount must be positive, got {amount}")]
    InvalidAmount {
        /// The offending amount
        amount: Decimal,
    },

    /// Level is outside the supported 1-5 window
    #[error("Level {level} is outside the supported range 1..=5")]
    InvalidLevel {
        /// The offending level
        level: u8,
    },

    /// Unrecognized account status string
    #[error("Invalid account status '{status}'")]
    InvalidStatus {
        /// The unrecognized status text
        status: String,
    },

    /// A replay operation row is missing a required field
    #[error("{op} operation requires a {field}")]
    MissingField {
        /// Operation name
        op: String,
        /// Name of the missing field
        field: String,
    },

    /// Arithmetic overflow would occur
    #[error("Arithmetic overflow in {operation} for account {account}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Account ID
        account: AccountId,
    },

    /// Arithmetic underflow would occur
    #[error("Arithmetic underflow in {operation} for account {account}")]
    ArithmeticUnderflow {
        /// Operation that would underflow
        operation: String,
        /// Account ID
        account: AccountId,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error occurred
    ///
    /// Recoverable during replay: the malformed row is skipped and
    /// processing continues with the next one.
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },
}

// Conversion from io::Error to LedgerError
impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::IoError {
            message: error.to_string(),
        }
    }
}

// Conversion from csv::Error to LedgerError
impl From<csv::Error> for LedgerError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        LedgerError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl LedgerError {
    /// Create an InsufficientFunds error
    pub fn insufficient_funds(account: AccountId, available: Decimal, requested: Decimal) -> Self {
        LedgerError::InsufficientFunds {
            account,
            available,
            requested,
        }
    }

    /// Create an AmountTooLow error
    pub fn amount_too_low(amount: Decimal, minimum: Decimal) -> Self {
        LedgerError::AmountTooLow { amount, minimum }
    }

    /// Create an AmountOutOfRange error
    pub fn amount_out_of_range(amount: Decimal, min: Decimal, max: Decimal) -> Self {
        LedgerError::AmountOutOfRange { amount, min, max }
    }

    /// Create a DepositThresholdNotMet error
    pub fn deposit_threshold_not_met(deposited: Decimal, required: Decimal) -> Self {
        LedgerError::DepositThresholdNotMet {
            deposited,
            required,
        }
    }

    /// Create an InvalidState error from the state's display form
    pub fn invalid_state(request: RequestId, current: impl ToString) -> Self {
        LedgerError::InvalidState {
            request,
            current: current.to_string(),
        }
    }

    /// Create a MissingReason error
    pub fn missing_reason(request: RequestId) -> Self {
        LedgerError::MissingReason { request }
    }

    /// Create a LevelTooLow error
    pub fn level_too_low(account: AccountId, level: u8, required: u8) -> Self {
        LedgerError::LevelTooLow {
            account,
            level,
            required,
        }
    }

    /// Create a CooldownActive error
    pub fn cooldown_active(
        account: AccountId,
        platform: Platform,
        level: u8,
        next_eligible: DateTime<Utc>,
    ) -> Self {
        LedgerError::CooldownActive {
            account,
            platform,
            level,
            next_eligible,
        }
    }

    /// Create an AccountNotFound error
    pub fn account_not_found(account: AccountId) -> Self {
        LedgerError::AccountNotFound { account }
    }

    /// Create a RequestNotFound error
    pub fn request_not_found(request: RequestId) -> Self {
        LedgerError::RequestNotFound { request }
    }

    /// Create an Unauthorized error
    pub fn unauthorized(action: &str) -> Self {
        LedgerError::Unauthorized {
            action: action.to_string(),
        }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: Decimal) -> Self {
        LedgerError::InvalidAmount { amount }
    }

    /// Create an InvalidLevel error
    pub fn invalid_level(level: u8) -> Self {
        LedgerError::InvalidLevel { level }
    }

    /// Create an InvalidStatus error
    pub fn invalid_status(status: &str) -> Self {
        LedgerError::InvalidStatus {
            status: status.to_string(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(op: &str, field: &str) -> Self {
        LedgerError::MissingField {
            op: op.to_string(),
            field: field.to_string(),
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, account: AccountId) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
            account,
        }
    }

    /// Create an ArithmeticUnderflow error
    pub fn arithmetic_underflow(operation: &str, account: AccountId) -> Self {
        LedgerError::ArithmeticUnderflow {
            operation: operation.to_string(),
            account,
        }
    }
}
