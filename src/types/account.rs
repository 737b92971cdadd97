//! Account-related types for the rewards ledger
//!
//! This module defines the Account structure holding the two currency pools
//! (`balance` and `commission`) together with the pool arithmetic that every
//! workflow transition ultimately funnels through.

use super::error::LedgerError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account identifier
///
/// Supports account IDs from 0 to 18,446,744,073,709,551,615
pub type AccountId = u64;

/// Lifecycle status of an account
///
/// The ledger carries the status as data; no balance operation is gated on
/// it. Status changes are an administrative action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    /// Account is in normal operation
    Active,
    /// Account has been temporarily suspended by an admin
    Suspended,
    /// Account has been permanently banned by an admin
    Banned,
    /// Account is awaiting activation
    Pending,
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AccountStatus::Active => "active",
            AccountStatus::Suspended => "suspended",
            AccountStatus::Banned => "banned",
            AccountStatus::Pending => "pending",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for AccountStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(AccountStatus::Active),
            "suspended" => Ok(AccountStatus::Suspended),
            "banned" => Ok(AccountStatus::Banned),
            "pending" => Ok(AccountStatus::Pending),
            other => Err(LedgerError::invalid_status(other)),
        }
    }
}

/// The two independent currency pools on an account
///
/// `Balance` grows through completed deposits, `Commission` through completed
/// tasks. Withdrawals consume both, commission first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pool {
    /// Funds credited by completed deposits
    Balance,
    /// Funds earned from completed tasks
    Commission,
}

/// Ledger state of a single account
///
/// Holds the two currency pools plus the counters consumed by the
/// eligibility policy and the level table. `total_balance` is always derived
/// from the pools, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// The account ID
    pub id: AccountId,

    /// Funds credited by completed deposits
    ///
    /// Never negative. Only deposit approval, withdrawal refunds and the
    /// exposed ledger operations may change it.
    pub balance: Decimal,

    /// Funds earned from completed tasks
    ///
    /// Never negative. Debits consume this pool before touching `balance`.
    pub commission: Decimal,

    /// Cumulative sum of all completed deposits
    ///
    /// Monotonically non-decreasing; gates withdrawal eligibility and
    /// level unlocks. Withdrawals and refunds never reduce it.
    pub deposited_total: Decimal,

    /// Number of tasks this account has completed
    pub tasks_completed: u32,

    /// Account level (1-5), gating per-task commission rates
    ///
    /// Never advances automatically; only an administrative action moves it.
    pub level: u8,

    /// Lifecycle status
    pub status: AccountStatus,
}

impl Account {
    /// Create a new account with zero balances at level 1
    ///
    /// # Arguments
    ///
    /// * `id` - The account ID for this account
    pub fn new(id: AccountId) -> Self {
        Account {
            id,
            balance: Decimal::ZERO,
            commission: Decimal::ZERO,
            deposited_total: Decimal::ZERO,
            tasks_completed: 0,
            level: 1,
            status: AccountStatus::Active,
        }
    }

    /// Total holdings across both pools
    ///
    /// Always computed as `balance + commission`; the sum is never stored.
    pub fn total_balance(&self) -> Decimal {
        self.balance + self.commission
    }

    /// Credit the named pool
    ///
    /// Increases only the named pool; `deposited_total` is untouched (that
    /// bump belongs to deposit approval, see [`Account::deposit`]).
    ///
    /// # Errors
    ///
    /// Returns an error if `amount` is not positive or the pool would
    /// overflow.
    pub fn credit(&mut self, pool: Pool, amount: Decimal) -> Result<(), LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::invalid_amount(amount));
        }

        match pool {
            Pool::Balance => {
                self.balance = self
                    .balance
                    .checked_add(amount)
                    .ok_or_else(|| LedgerError::arithmetic_overflow("credit", self.id))?;
            }
            Pool::Commission => {
                self.commission = self
                    .commission
                    .checked_add(amount)
                    .ok_or_else(|| LedgerError::arithmetic_overflow("credit", self.id))?;
            }
        }

        Ok(())
    }

    /// Debit total holdings, commission first
    ///
    /// If `amount <= commission` the debit is taken from `commission` alone.
    /// Otherwise `commission` is zeroed and the remainder comes out of
    /// `balance`. The affordability check happens before any mutation, so a
    /// failed debit leaves both pools untouched.
    ///
    /// # Errors
    ///
    /// * [`LedgerError::InsufficientFunds`] if `amount` exceeds
    ///   `balance + commission`
    /// * [`LedgerError::InvalidAmount`] if `amount` is not positive
    pub fn debit(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::invalid_amount(amount));
        }

        let total = self.total_balance();
        if amount > total {
            return Err(LedgerError::insufficient_funds(self.id, total, amount));
        }

        if amount <= self.commission {
            self.commission = self
                .commission
                .checked_sub(amount)
                .ok_or_else(|| LedgerError::arithmetic_underflow("debit", self.id))?;
        } else {
            let remaining = amount - self.commission;
            let new_balance = self
                .balance
                .checked_sub(remaining)
                .ok_or_else(|| LedgerError::arithmetic_underflow("debit", self.id))?;
            self.commission = Decimal::ZERO;
            self.balance = new_balance;
        }

        Ok(())
    }

    /// Restore funds after a rejected withdrawal, commission first
    ///
    /// Restores up to the current `commission` shortfall rule: the slice a
    /// debit executed now would take from `commission` (`min(amount,
    /// commission)`) goes back to `commission`, the rest spills into
    /// `balance`. The net effect is always exactly `+amount`; the split is
    /// deterministic because the original debit split is not persisted
    /// anywhere.
    ///
    /// # Errors
    ///
    /// Returns an error if `amount` is not positive or a pool would overflow.
    pub fn refund(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::invalid_amount(amount));
        }

        let to_commission = amount.min(self.commission);
        let to_balance = amount - to_commission;

        let new_commission = self
            .commission
            .checked_add(to_commission)
            .ok_or_else(|| LedgerError::arithmetic_overflow("refund", self.id))?;
        let new_balance = self
            .balance
            .checked_add(to_balance)
            .ok_or_else(|| LedgerError::arithmetic_overflow("refund", self.id))?;

        self.commission = new_commission;
        self.balance = new_balance;

        Ok(())
    }

    /// Apply a completed deposit
    ///
    /// Credits `balance` and bumps `deposited_total` by the same amount.
    /// Both updates succeed or neither does.
    ///
    /// # Errors
    ///
    /// Returns an error if `amount` is not positive or either field would
    /// overflow.
    pub fn deposit(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::invalid_amount(amount));
        }

        let new_balance = self
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("deposit", self.id))?;
        let new_deposited = self
            .deposited_total
            .checked_add(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("deposit", self.id))?;

        self.balance = new_balance;
        self.deposited_total = new_deposited;

        Ok(())
    }

    /// Award task commission
    ///
    /// Credits the `commission` pool and increments the completed-task
    /// counter as one step.
    ///
    /// # Errors
    ///
    /// Returns an error if `amount` is not positive or the pool would
    /// overflow.
    pub fn add_commission(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::invalid_amount(amount));
        }

        self.commission = self
            .commission
            .checked_add(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("add_commission", self.id))?;
        self.tasks_completed += 1;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn account_with(balance: Decimal, commission: Decimal) -> Account {
        let mut account = Account::new(1);
        account.balance = balance;
        account.commission = commission;
        account
    }

    #[test]
    fn new_account_starts_empty_at_level_one() {
        let account = Account::new(7);
        assert_eq!(account.id, 7);
        assert_eq!(account.balance, Decimal::ZERO);
        assert_eq!(account.commission, Decimal::ZERO);
        assert_eq!(account.deposited_total, Decimal::ZERO);
        assert_eq!(account.tasks_completed, 0);
        assert_eq!(account.level, 1);
        assert_eq!(account.status, AccountStatus::Active);
    }

    #[test]
    fn total_balance_is_derived_from_both_pools() {
        let account = account_with(dec!(150_000), dec!(2_200));
        assert_eq!(account.total_balance(), dec!(152_200));
    }

    #[rstest]
    #[case::balance(Pool::Balance, dec!(50_000), dec!(50_000), dec!(0))]
    #[case::commission(Pool::Commission, dec!(1_500), dec!(0), dec!(1_500))]
    fn credit_touches_only_the_named_pool(
        #[case] pool: Pool,
        #[case] amount: Decimal,
        #[case] expected_balance: Decimal,
        #[case] expected_commission: Decimal,
    ) {
        let mut account = Account::new(1);
        account.credit(pool, amount).unwrap();
        assert_eq!(account.balance, expected_balance);
        assert_eq!(account.commission, expected_commission);
        assert_eq!(account.deposited_total, Decimal::ZERO);
    }

    #[rstest]
    #[case(dec!(0))]
    #[case(dec!(-100))]
    fn credit_rejects_non_positive_amounts(#[case] amount: Decimal) {
        let mut account = Account::new(1);
        let result = account.credit(Pool::Balance, amount);
        assert_eq!(result, Err(LedgerError::invalid_amount(amount)));
        assert_eq!(account.balance, Decimal::ZERO);
    }

    #[test]
    fn debit_within_commission_leaves_balance_unchanged() {
        let mut account = account_with(dec!(200_000), dec!(5_000));
        account.debit(dec!(3_000)).unwrap();
        assert_eq!(account.balance, dec!(200_000));
        assert_eq!(account.commission, dec!(2_000));
    }

    #[test]
    fn debit_exceeding_commission_zeroes_it_and_spills_into_balance() {
        let mut account = account_with(dec!(200_000), dec!(5_000));
        account.debit(dec!(105_000)).unwrap();
        assert_eq!(account.commission, Decimal::ZERO);
        assert_eq!(account.balance, dec!(100_000));
    }

    #[test]
    fn debit_of_exactly_the_commission_empties_it() {
        let mut account = account_with(dec!(50_000), dec!(5_000));
        account.debit(dec!(5_000)).unwrap();
        assert_eq!(account.commission, Decimal::ZERO);
        assert_eq!(account.balance, dec!(50_000));
    }

    #[test]
    fn debit_beyond_total_fails_and_mutates_nothing() {
        let mut account = account_with(dec!(100_000), dec!(5_000));
        let result = account.debit(dec!(105_001));
        assert_eq!(
            result,
            Err(LedgerError::insufficient_funds(1, dec!(105_000), dec!(105_001)))
        );
        assert_eq!(account.balance, dec!(100_000));
        assert_eq!(account.commission, dec!(5_000));
    }

    #[test]
    fn debit_of_the_entire_total_leaves_both_pools_at_zero() {
        let mut account = account_with(dec!(100_000), dec!(5_000));
        account.debit(dec!(105_000)).unwrap();
        assert_eq!(account.balance, Decimal::ZERO);
        assert_eq!(account.commission, Decimal::ZERO);
    }

    #[test]
    fn refund_restores_commission_slice_first() {
        let mut account = account_with(dec!(50_000), dec!(2_000));
        account.refund(dec!(10_000)).unwrap();
        // min(10_000, 2_000) back to commission, the rest to balance
        assert_eq!(account.commission, dec!(4_000));
        assert_eq!(account.balance, dec!(58_000));
        assert_eq!(account.total_balance(), dec!(62_000));
    }

    #[test]
    fn refund_with_empty_commission_goes_entirely_to_balance() {
        let mut account = account_with(dec!(50_000), dec!(0));
        account.refund(dec!(150_000)).unwrap();
        assert_eq!(account.commission, Decimal::ZERO);
        assert_eq!(account.balance, dec!(200_000));
    }

    #[test]
    fn refund_net_effect_is_exactly_the_amount() {
        let mut account = account_with(dec!(123_456), dec!(7_890));
        let before = account.total_balance();
        account.refund(dec!(100_000)).unwrap();
        assert_eq!(account.total_balance(), before + dec!(100_000));
    }

    #[test]
    fn deposit_credits_balance_and_deposited_total_together() {
        let mut account = Account::new(1);
        account.deposit(dec!(200_000)).unwrap();
        assert_eq!(account.balance, dec!(200_000));
        assert_eq!(account.deposited_total, dec!(200_000));
        assert_eq!(account.commission, Decimal::ZERO);
    }

    #[test]
    fn deposited_total_survives_debits() {
        let mut account = Account::new(1);
        account.deposit(dec!(200_000)).unwrap();
        account.debit(dec!(150_000)).unwrap();
        assert_eq!(account.balance, dec!(50_000));
        assert_eq!(account.deposited_total, dec!(200_000));
    }

    #[test]
    fn add_commission_credits_pool_and_counts_the_task() {
        let mut account = Account::new(1);
        account.add_commission(dec!(2_200)).unwrap();
        account.add_commission(dec!(1_500)).unwrap();
        assert_eq!(account.commission, dec!(3_700));
        assert_eq!(account.tasks_completed, 2);
        assert_eq!(account.balance, Decimal::ZERO);
    }

    #[test]
    fn pools_stay_non_negative_across_a_mixed_sequence() {
        let mut account = Account::new(1);
        account.deposit(dec!(500_000)).unwrap();
        account.add_commission(dec!(5_500)).unwrap();
        account.debit(dec!(100_000)).unwrap();
        account.refund(dec!(100_000)).unwrap();
        account.debit(dec!(405_500)).unwrap();
        assert!(account.balance >= Decimal::ZERO);
        assert!(account.commission >= Decimal::ZERO);
        assert_eq!(account.total_balance(), dec!(100_000));
    }

    #[rstest]
    #[case("active", AccountStatus::Active)]
    #[case("suspended", AccountStatus::Suspended)]
    #[case("banned", AccountStatus::Banned)]
    #[case("pending", AccountStatus::Pending)]
    fn status_round_trips_through_strings(#[case] text: &str, #[case] status: AccountStatus) {
        assert_eq!(text.parse::<AccountStatus>().unwrap(), status);
        assert_eq!(status.to_string(), text);
    }

    #[test]
    fn unknown_status_string_is_rejected() {
        assert!("frozen".parse::<AccountStatus>().is_err());
    }
}
