//! Withdrawal eligibility policy
//!
//! A pure check over an account snapshot: no store access, no clock, no
//! mutation. The report lists every failed condition in a fixed order so
//! callers can render a stable message list.

use crate::config::LedgerConfig;
use crate::types::Account;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// A single failed eligibility condition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum IneligibilityReason {
    /// Cumulative deposits are below the withdrawal threshold
    DepositThresholdNotMet {
        /// Cumulative completed deposits
        deposited: Decimal,
        /// Required minimum
        required: Decimal,
    },
    /// Total holdings are below the eligibility minimum
    BalanceBelowMinimum {
        /// Current total holdings
        total: Decimal,
        /// Required minimum
        required: Decimal,
    },
}

impl fmt::Display for IneligibilityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IneligibilityReason::DepositThresholdNotMet {
                deposited,
                required,
            } => write!(
                f,
                "deposited total {} is below the required {}",
                deposited, required
            ),
            IneligibilityReason::BalanceBelowMinimum { total, required } => write!(
                f,
                "total balance {} is below the required {}",
                total, required
            ),
        }
    }
}

/// Outcome of the eligibility check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EligibilityReport {
    /// Whether the account may create withdrawal requests right now
    pub eligible: bool,

    /// Failed conditions, in fixed order: deposit threshold first, then
    /// minimum balance. Empty exactly when `eligible` is true.
    pub reasons: Vec<IneligibilityReason>,

    /// The largest amount a single withdrawal could request right now:
    /// the configured maximum capped by the account's total holdings
    pub max_withdraw: Decimal,
}

/// Check whether an account may withdraw
///
/// Eligible iff the cumulative deposits reach the deposit threshold and the
/// total holdings reach the minimum balance. Both conditions are always
/// evaluated so the report is complete.
pub fn check_withdraw_eligibility(account: &Account, config: &LedgerConfig) -> EligibilityReport {
    let total = account.total_balance();
    let mut reasons = Vec::new();

    if account.deposited_total < config.min_deposited_for_withdraw {
        reasons.push(IneligibilityReason::DepositThresholdNotMet {
            deposited: account.deposited_total,
            required: config.min_deposited_for_withdraw,
        });
    }

    if total < config.min_balance_for_withdraw {
        reasons.push(IneligibilityReason::BalanceBelowMinimum {
            total,
            required: config.min_balance_for_withdraw,
        });
    }

    EligibilityReport {
        eligible: reasons.is_empty(),
        reasons,
        max_withdraw: config.max_withdraw.min(total),
    }
}
