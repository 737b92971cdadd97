//! Ledger configuration
//!
//! Every business limit lives here and is injected into the engine once, so
//! no workflow hard-codes a threshold at its call site. `Default` carries the
//! production numbers; tests construct variants as needed.

use chrono::Duration;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Limits and thresholds governing the ledger workflows
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerConfig {
    /// Smallest accepted deposit amount
    pub min_deposit: Decimal,

    /// Smallest accepted withdrawal amount
    pub min_withdraw: Decimal,

    /// Largest accepted withdrawal amount
    pub max_withdraw: Decimal,

    /// Cumulative deposits an account needs before it may withdraw
    pub min_deposited_for_withdraw: Decimal,

    /// Total holdings an account needs to count as withdrawal-eligible
    pub min_balance_for_withdraw: Decimal,

    /// Hours between task completions per (platform, level)
    pub task_cooldown_hours: i64,
}

impl LedgerConfig {
    /// Cooldown window between task completions as a duration
    pub fn task_cooldown(&self) -> Duration {
        Duration::hours(self.task_cooldown_hours)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            min_deposit: dec!(50_000),
            min_withdraw: dec!(100_000),
            max_withdraw: dec!(5_000_000),
            min_deposited_for_withdraw: dec!(50_000),
            min_balance_for_withdraw: dec!(100_000),
            task_cooldown_hours: 24,
        }
    }
}
