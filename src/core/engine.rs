//! Core ledger engine orchestrating accounts, requests and tasks
//!
//! This module provides the `LedgerEngine`, the single entry point for every
//! workflow operation: deposit and withdrawal lifecycles, task completions,
//! direct ledger credits/debits and administrative account changes.
//!
//! # Design
//!
//! The engine owns no state of its own; it coordinates the [`AccountStore`]
//! and the [`RequestStore`] and enforces the rules between them. A request
//! transition and its ledger effect commit as one unit: the engine performs
//! the account mutation inside the request's entry-lock closure, so no thread
//! can observe a completed request whose funds have not moved (or the other
//! way around). Lock order is uniformly request entry first, then account
//! entry.
//!
//! Time is injected through the [`Clock`] trait. Production uses the system
//! clock; replay and tests drive a [`SimClock`](super::clock::SimClock) so
//! cooldowns and audit stamps are deterministic.
//!
//! # Thread Safety
//!
//! The engine is `Clone` and shares its stores through `Arc`; clones operate
//! on the same ledger. All operations are safe to call concurrently.

use crate::config::LedgerConfig;
use crate::types::{
    Account, AccountId, AccountStatus, Actor, BankDetails, Capability, DepositRequest,
    DepositStatus, LedgerError, OpKind, OperationRecord, PaymentMethod, Platform, Pool, RequestId,
    TaskCompletion, WithdrawRequest, WithdrawStatus,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info};

use super::accounts::AccountStore;
use super::clock::{Clock, SystemClock};
use super::eligibility::{check_withdraw_eligibility, EligibilityReport};
use super::levels::{commission_rate, level_overview, LevelOverview};
use super::requests::RequestStore;

/// The ledger engine
///
/// Coordinates the account ledger and the request/task audit store under a
/// shared configuration and an injected clock. Cheap to clone; clones share
/// all state.
#[derive(Debug, Clone)]
pub struct LedgerEngine {
    /// Account records and pool arithmetic
    accounts: Arc<AccountStore>,

    /// Requests and task completions
    requests: Arc<RequestStore>,

    /// Business limits and thresholds
    config: Arc<LedgerConfig>,

    /// Source of the current instant
    clock: Arc<dyn Clock>,
}

impl Default for LedgerEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerEngine {
    /// Create an engine with the default configuration and the system clock
    pub fn new() -> Self {
        Self::with_config(LedgerConfig::default())
    }

    /// Create an engine with an explicit configuration and the system clock
    pub fn with_config(config: LedgerConfig) -> Self {
        LedgerEngine {
            accounts: Arc::new(AccountStore::new()),
            requests: Arc::new(RequestStore::new()),
            config: Arc::new(config),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock, keeping the shared stores and configuration
    ///
    /// Replay partitions clone the engine and install a per-partition
    /// simulated clock through this.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The account store
    pub fn accounts(&self) -> &AccountStore {
        &self.accounts
    }

    /// The request and task store
    pub fn requests(&self) -> &RequestStore {
        &self.requests
    }

    /// The active configuration
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    fn require(actor: &Actor, capability: Capability, action: &str) -> Result<(), LedgerError> {
        if actor.can(capability) {
            Ok(())
        } else {
            Err(LedgerError::unauthorized(action))
        }
    }

    // ---- deposits ----

    /// Create a pending deposit request
    ///
    /// Creates the account if the ledger has not seen it yet. No funds move
    /// until an admin approves the request.
    ///
    /// # Errors
    ///
    /// [`LedgerError::AmountTooLow`] below the configured minimum deposit.
    pub fn create_deposit(
        &self,
        account: AccountId,
        amount: Decimal,
        method: PaymentMethod,
    ) -> Result<DepositRequest, LedgerError> {
        if amount < self.config.min_deposit {
            return Err(LedgerError::amount_too_low(amount, self.config.min_deposit));
        }

        self.accounts.get_or_create(account);
        let id = self.requests.next_id();
        let request = DepositRequest::new(id, account, amount, method, self.clock.now());
        self.requests.insert_deposit(request.clone());
        debug!(request = id, account, %amount, "deposit request created");
        Ok(request)
    }

    /// Approve a pending deposit, crediting the account
    ///
    /// Credits `balance` and bumps `deposited_total` inside the request's
    /// entry lock, so the transition and the credit land together.
    ///
    /// # Errors
    ///
    /// * [`LedgerError::Unauthorized`] if the actor may not approve deposits
    /// * [`LedgerError::RequestNotFound`] for unknown request IDs
    /// * [`LedgerError::InvalidState`] unless the request is pending
    pub fn approve_deposit(
        &self,
        actor: &Actor,
        id: RequestId,
    ) -> Result<DepositRequest, LedgerError> {
        Self::require(actor, Capability::ApproveDeposits, "approve deposit requests")?;

        let now = self.clock.now();
        let request = self.requests.update_deposit(id, |request| {
            if request.status != DepositStatus::Pending {
                return Err(LedgerError::invalid_state(id, request.status));
            }

            self.accounts
                .update(request.account, |account| account.deposit(request.amount))?;

            request.status = DepositStatus::Completed;
            request.approved_at = Some(now);
            request.approved_by = actor.admin_id();
            Ok(())
        })?;

        info!(request = id, account = request.account, amount = %request.amount, "deposit approved");
        Ok(request)
    }

    /// Reject a pending deposit with a mandatory reason
    ///
    /// The ledger is never touched; the request just becomes `failed`.
    ///
    /// # Errors
    ///
    /// * [`LedgerError::Unauthorized`] if the actor may not decide deposits
    /// * [`LedgerError::RequestNotFound`] for unknown request IDs
    /// * [`LedgerError::InvalidState`] unless the request is pending
    /// * [`LedgerError::MissingReason`] for an empty reason
    pub fn reject_deposit(
        &self,
        actor: &Actor,
        id: RequestId,
        reason: &str,
    ) -> Result<DepositRequest, LedgerError> {
        Self::require(actor, Capability::ApproveDeposits, "reject deposit requests")?;

        let now = self.clock.now();
        let request = self.requests.update_deposit(id, |request| {
            if request.status != DepositStatus::Pending {
                return Err(LedgerError::invalid_state(id, request.status));
            }
            if reason.trim().is_empty() {
                return Err(LedgerError::missing_reason(id));
            }

            request.status = DepositStatus::Failed;
            request.rejected_at = Some(now);
            request.rejected_by = actor.admin_id();
            request.rejection_reason = Some(reason.to_string());
            Ok(())
        })?;

        info!(request = id, account = request.account, reason, "deposit rejected");
        Ok(request)
    }

    /// Cancel a pending deposit as its owner
    ///
    /// # Errors
    ///
    /// * [`LedgerError::Unauthorized`] unless the actor owns the request's
    ///   account
    /// * [`LedgerError::RequestNotFound`] for unknown request IDs
    /// * [`LedgerError::InvalidState`] unless the request is pending
    pub fn cancel_deposit(
        &self,
        actor: &Actor,
        id: RequestId,
    ) -> Result<DepositRequest, LedgerError> {
        let request = self.requests.update_deposit(id, |request| {
            if !actor.owns(request.account) {
                return Err(LedgerError::unauthorized("cancel this deposit request"));
            }
            if request.status != DepositStatus::Pending {
                return Err(LedgerError::invalid_state(id, request.status));
            }

            request.status = DepositStatus::Cancelled;
            Ok(())
        })?;

        debug!(request = id, account = request.account, "deposit cancelled");
        Ok(request)
    }

    // ---- withdrawals ----

    /// Create a pending withdrawal request
    ///
    /// Validates only; no funds are reserved or moved. Several pending
    /// withdrawals may jointly exceed the balance, which is resolved when
    /// admins decide them. Checks run in a fixed order: account existence,
    /// deposit threshold, amount window, then current holdings.
    ///
    /// # Errors
    ///
    /// * [`LedgerError::AccountNotFound`] for unknown accounts
    /// * [`LedgerError::DepositThresholdNotMet`] below the deposit threshold
    /// * [`LedgerError::AmountOutOfRange`] outside the configured window
    /// * [`LedgerError::InsufficientFunds`] above the current total holdings
    pub fn create_withdrawal(
        &self,
        account: AccountId,
        amount: Decimal,
        bank: BankDetails,
    ) -> Result<WithdrawRequest, LedgerError> {
        let snapshot = self
            .accounts
            .get(account)
            .ok_or_else(|| LedgerError::account_not_found(account))?;

        if snapshot.deposited_total < self.config.min_deposited_for_withdraw {
            return Err(LedgerError::deposit_threshold_not_met(
                snapshot.deposited_total,
                self.config.min_deposited_for_withdraw,
            ));
        }
        if amount < self.config.min_withdraw || amount > self.config.max_withdraw {
            return Err(LedgerError::amount_out_of_range(
                amount,
                self.config.min_withdraw,
                self.config.max_withdraw,
            ));
        }
        let total = snapshot.total_balance();
        if amount > total {
            return Err(LedgerError::insufficient_funds(account, total, amount));
        }

        let id = self.requests.next_id();
        let request = WithdrawRequest::new(id, account, amount, bank, self.clock.now());
        self.requests.insert_withdrawal(request.clone());
        debug!(request = id, account, %amount, "withdrawal request created");
        Ok(request)
    }

    /// Move a pending withdrawal into processing
    ///
    /// The ledger is untouched; the admin executes the transfer out-of-band
    /// and confirms it through [`LedgerEngine::complete_withdrawal`].
    ///
    /// # Errors
    ///
    /// * [`LedgerError::Unauthorized`] if the actor may not decide
    ///   withdrawals
    /// * [`LedgerError::RequestNotFound`] for unknown request IDs
    /// * [`LedgerError::InvalidState`] unless the request is pending
    pub fn approve_withdrawal(
        &self,
        actor: &Actor,
        id: RequestId,
    ) -> Result<WithdrawRequest, LedgerError> {
        Self::require(
            actor,
            Capability::ApproveWithdrawals,
            "approve withdrawal requests",
        )?;

        let now = self.clock.now();
        let request = self.requests.update_withdrawal(id, |request| {
            if request.status != WithdrawStatus::Pending {
                return Err(LedgerError::invalid_state(id, request.status));
            }

            request.status = WithdrawStatus::Processing;
            request.approved_at = Some(now);
            request.approved_by = actor.admin_id();
            Ok(())
        })?;

        info!(request = id, account = request.account, "withdrawal approved");
        Ok(request)
    }

    /// Confirm the external transfer of a processing withdrawal
    ///
    /// Records the external transaction reference and finalizes the request.
    /// No pool changes here; the payout happened outside the ledger.
    ///
    /// # Errors
    ///
    /// * [`LedgerError::Unauthorized`] if the actor may not decide
    ///   withdrawals
    /// * [`LedgerError::RequestNotFound`] for unknown request IDs
    /// * [`LedgerError::InvalidState`] unless the request is processing
    pub fn complete_withdrawal(
        &self,
        actor: &Actor,
        id: RequestId,
        external_txn: Option<String>,
    ) -> Result<WithdrawRequest, LedgerError> {
        Self::require(
            actor,
            Capability::ApproveWithdrawals,
            "complete withdrawal requests",
        )?;

        let now = self.clock.now();
        let request = self.requests.update_withdrawal(id, |request| {
            if request.status != WithdrawStatus::Processing {
                return Err(LedgerError::invalid_state(id, request.status));
            }

            request.status = WithdrawStatus::Completed;
            request.completed_at = Some(now);
            request.processed_by = actor.admin_id();
            request.external_txn = external_txn;
            Ok(())
        })?;

        info!(request = id, account = request.account, amount = %request.amount, "withdrawal completed");
        Ok(request)
    }

    /// Reject a withdrawal with a mandatory reason, refunding the amount
    ///
    /// Allowed from both `pending` and `processing`. The refund restores the
    /// full amount commission-first, inside the request's entry lock.
    ///
    /// # Errors
    ///
    /// * [`LedgerError::Unauthorized`] if the actor may not decide
    ///   withdrawals
    /// * [`LedgerError::RequestNotFound`] for unknown request IDs
    /// * [`LedgerError::InvalidState`] from a terminal state
    /// * [`LedgerError::MissingReason`] for an empty reason
    pub fn reject_withdrawal(
        &self,
        actor: &Actor,
        id: RequestId,
        reason: &str,
    ) -> Result<WithdrawRequest, LedgerError> {
        Self::require(
            actor,
            Capability::ApproveWithdrawals,
            "reject withdrawal requests",
        )?;

        let now = self.clock.now();
        let request = self.requests.update_withdrawal(id, |request| {
            if request.status.is_terminal() {
                return Err(LedgerError::invalid_state(id, request.status));
            }
            if reason.trim().is_empty() {
                return Err(LedgerError::missing_reason(id));
            }

            self.accounts
                .update_existing(request.account, |account| account.refund(request.amount))?;

            request.status = WithdrawStatus::Failed;
            request.rejected_at = Some(now);
            request.rejected_by = actor.admin_id();
            request.rejection_reason = Some(reason.to_string());
            Ok(())
        })?;

        info!(request = id, account = request.account, reason, "withdrawal rejected");
        Ok(request)
    }

    /// Cancel a pending withdrawal as its owner
    ///
    /// Only `pending` requests can be cancelled; once an admin has started
    /// processing, the owner can no longer withdraw the request.
    ///
    /// # Errors
    ///
    /// * [`LedgerError::Unauthorized`] unless the actor owns the request's
    ///   account
    /// * [`LedgerError::RequestNotFound`] for unknown request IDs
    /// * [`LedgerError::InvalidState`] unless the request is pending
    pub fn cancel_withdrawal(
        &self,
        actor: &Actor,
        id: RequestId,
    ) -> Result<WithdrawRequest, LedgerError> {
        let request = self.requests.update_withdrawal(id, |request| {
            if !actor.owns(request.account) {
                return Err(LedgerError::unauthorized("cancel this withdrawal request"));
            }
            if request.status != WithdrawStatus::Pending {
                return Err(LedgerError::invalid_state(id, request.status));
            }

            request.status = WithdrawStatus::Cancelled;
            Ok(())
        })?;

        debug!(request = id, account = request.account, "withdrawal cancelled");
        Ok(request)
    }

    // ---- tasks ----

    /// Record a task completion and credit its commission
    ///
    /// The commission rate comes from the level table. The account's level
    /// must reach the task's level, and the per-`(platform, level)` cooldown
    /// must have elapsed since the last completion of the same tuple. Credit
    /// and history entry land inside the account's entry lock.
    ///
    /// # Errors
    ///
    /// * [`LedgerError::Unauthorized`] unless the actor owns the account
    /// * [`LedgerError::InvalidLevel`] outside the 1-5 window
    /// * [`LedgerError::LevelTooLow`] if the account has not unlocked the
    ///   level
    /// * [`LedgerError::CooldownActive`] inside the cooldown window
    pub fn complete_task(
        &self,
        actor: &Actor,
        account: AccountId,
        platform: Platform,
        level: u8,
    ) -> Result<TaskCompletion, LedgerError> {
        if !actor.owns(account) {
            return Err(LedgerError::unauthorized(
                "complete tasks for another account",
            ));
        }
        let rate = commission_rate(level)?;
        let now = self.clock.now();

        let completion = self.accounts.update(account, |acct| {
            if acct.level < level {
                return Err(LedgerError::level_too_low(account, acct.level, level));
            }

            if let Some(last) = self.requests.last_task_completion(account, platform, level) {
                let next_eligible = last + self.config.task_cooldown();
                if now < next_eligible {
                    return Err(LedgerError::cooldown_active(
                        account,
                        platform,
                        level,
                        next_eligible,
                    ));
                }
            }

            acct.add_commission(rate)?;

            let completion = TaskCompletion {
                id: self.requests.next_id(),
                account,
                platform,
                level,
                commission: rate,
                completed_at: now,
            };
            self.requests.record_task(completion.clone());
            Ok(completion)
        })?;

        debug!(
            account,
            platform = %platform,
            level,
            commission = %completion.commission,
            "task completed"
        );
        Ok(completion)
    }

    // ---- direct ledger operations ----

    /// Credit the named pool of an account, creating it if needed
    ///
    /// `deposited_total` is untouched; that bump belongs to deposit approval.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is not positive or the pool would
    /// overflow.
    pub fn credit(
        &self,
        account: AccountId,
        amount: Decimal,
        pool: Pool,
    ) -> Result<(), LedgerError> {
        self.accounts.credit(account, amount, pool)
    }

    /// Debit an account's total holdings, commission first
    ///
    /// # Errors
    ///
    /// * [`LedgerError::AccountNotFound`] for unknown accounts
    /// * [`LedgerError::InsufficientFunds`] beyond the total holdings
    pub fn debit(&self, account: AccountId, amount: Decimal) -> Result<(), LedgerError> {
        self.accounts.debit(account, amount)
    }

    // ---- administration and queries ----

    /// Set an account's level
    ///
    /// # Errors
    ///
    /// * [`LedgerError::Unauthorized`] if the actor may not manage accounts
    /// * [`LedgerError::InvalidLevel`] outside the 1-5 window
    /// * [`LedgerError::AccountNotFound`] for unknown accounts
    pub fn set_account_level(
        &self,
        actor: &Actor,
        account: AccountId,
        level: u8,
    ) -> Result<(), LedgerError> {
        Self::require(actor, Capability::ManageAccounts, "set account levels")?;
        self.accounts.set_level(account, level)?;
        info!(account, level, "account level set");
        Ok(())
    }

    /// Set an account's lifecycle status
    ///
    /// # Errors
    ///
    /// * [`LedgerError::Unauthorized`] if the actor may not manage accounts
    /// * [`LedgerError::AccountNotFound`] for unknown accounts
    pub fn set_account_status(
        &self,
        actor: &Actor,
        account: AccountId,
        status: AccountStatus,
    ) -> Result<(), LedgerError> {
        Self::require(actor, Capability::ManageAccounts, "set account status")?;
        self.accounts.set_status(account, status)?;
        info!(account, %status, "account status set");
        Ok(())
    }

    /// Withdrawal eligibility report for an account
    ///
    /// # Errors
    ///
    /// [`LedgerError::AccountNotFound`] for unknown accounts.
    pub fn withdraw_eligibility(
        &self,
        account: AccountId,
    ) -> Result<EligibilityReport, LedgerError> {
        let snapshot = self
            .accounts
            .get(account)
            .ok_or_else(|| LedgerError::account_not_found(account))?;
        Ok(check_withdraw_eligibility(&snapshot, &self.config))
    }

    /// Level table annotated with the account's unlock state
    ///
    /// # Errors
    ///
    /// [`LedgerError::AccountNotFound`] for unknown accounts.
    pub fn level_overview(&self, account: AccountId) -> Result<Vec<LevelOverview>, LedgerError> {
        let snapshot = self
            .accounts
            .get(account)
            .ok_or_else(|| LedgerError::account_not_found(account))?;
        Ok(level_overview(&snapshot))
    }

    /// Snapshot of an account
    pub fn account(&self, account: AccountId) -> Option<Account> {
        self.accounts.get(account)
    }

    // ---- replay dispatch ----

    /// Apply one parsed replay operation
    ///
    /// Resolves the row's actor against its account and dispatches on the
    /// operation kind. Optional columns each kind requires are validated
    /// here. The simulated clock is expected to already sit at the row's
    /// instant; `apply` never advances time itself.
    ///
    /// # Errors
    ///
    /// [`LedgerError::MissingField`] when a required column is absent, plus
    /// whatever the dispatched operation returns.
    pub fn apply(&self, record: &OperationRecord) -> Result<(), LedgerError> {
        let actor = record.actor.resolve(record.account);
        let op = record.kind.to_string();

        match record.kind {
            OpKind::DepositRequest => {
                let amount = Self::required_amount(record, &op)?;
                self.create_deposit(record.account, amount, PaymentMethod::default())?;
            }
            OpKind::DepositApprove => {
                self.approve_deposit(&actor, Self::required_request(record, &op)?)?;
            }
            OpKind::DepositReject => {
                let id = Self::required_request(record, &op)?;
                let reason = Self::required_note(record, &op, "reason")?;
                self.reject_deposit(&actor, id, reason)?;
            }
            OpKind::DepositCancel => {
                self.cancel_deposit(&actor, Self::required_request(record, &op)?)?;
            }
            OpKind::WithdrawRequest => {
                let amount = Self::required_amount(record, &op)?;
                let bank = BankDetails {
                    bank_name: record.note.clone().unwrap_or_default(),
                    ..BankDetails::default()
                };
                self.create_withdrawal(record.account, amount, bank)?;
            }
            OpKind::WithdrawApprove => {
                self.approve_withdrawal(&actor, Self::required_request(record, &op)?)?;
            }
            OpKind::WithdrawComplete => {
                let id = Self::required_request(record, &op)?;
                self.complete_withdrawal(&actor, id, record.note.clone())?;
            }
            OpKind::WithdrawReject => {
                let id = Self::required_request(record, &op)?;
                let reason = Self::required_note(record, &op, "reason")?;
                self.reject_withdrawal(&actor, id, reason)?;
            }
            OpKind::WithdrawCancel => {
                self.cancel_withdrawal(&actor, Self::required_request(record, &op)?)?;
            }
            OpKind::TaskComplete => {
                let platform = record
                    .platform
                    .ok_or_else(|| LedgerError::missing_field(&op, "platform"))?;
                let level = record
                    .level
                    .ok_or_else(|| LedgerError::missing_field(&op, "level"))?;
                self.complete_task(&actor, record.account, platform, level)?;
            }
            OpKind::LevelSet => {
                let level = record
                    .level
                    .ok_or_else(|| LedgerError::missing_field(&op, "level"))?;
                self.set_account_level(&actor, record.account, level)?;
            }
            OpKind::StatusSet => {
                let status: AccountStatus = Self::required_note(record, &op, "status")?.parse()?;
                self.set_account_status(&actor, record.account, status)?;
            }
            OpKind::Credit => {
                let amount = Self::required_amount(record, &op)?;
                let pool = if record.note.as_deref() == Some("commission") {
                    Pool::Commission
                } else {
                    Pool::Balance
                };
                self.credit(record.account, amount, pool)?;
            }
            OpKind::Debit => {
                let amount = Self::required_amount(record, &op)?;
                self.debit(record.account, amount)?;
            }
        }

        Ok(())
    }

    fn required_amount(record: &OperationRecord, op: &str) -> Result<Decimal, LedgerError> {
        record
            .amount
            .ok_or_else(|| LedgerError::missing_field(op, "amount"))
    }

    fn required_request(record: &OperationRecord, op: &str) -> Result<RequestId, LedgerError> {
        record
            .request
            .ok_or_else(|| LedgerError::missing_field(op, "request id"))
    }

    fn required_note<'a>(
        record: &'a OperationRecord,
        op: &str,
        field: &str,
    ) -> Result<&'a str, LedgerError> {
        record
            .note
            .as_deref()
            .ok_or_else(|| LedgerError::missing_field(op, field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::SimClock;
    use crate::core::eligibility::IneligibilityReason;
    use crate::types::{ActorSpec, AdminRole};
    use rust_decimal_macros::dec;

    const HOUR: i64 = 3_600;

    fn engine_at(secs: i64) -> (LedgerEngine, Arc<SimClock>) {
        let clock = Arc::new(SimClock::new());
        clock.set_secs(secs);
        let engine = LedgerEngine::new().with_clock(clock.clone());
        (engine, clock)
    }

    fn admin() -> Actor {
        Actor::admin(1, AdminRole::Admin)
    }

    fn funded_account(engine: &LedgerEngine, account: AccountId, amount: Decimal) {
        let request = engine
            .create_deposit(account, amount, PaymentMethod::BankTransfer)
            .unwrap();
        engine.approve_deposit(&admin(), request.id).unwrap();
    }

    #[test]
    fn deposit_approval_credits_balance_and_deposited_total() {
        let (engine, _) = engine_at(0);
        let request = engine
            .create_deposit(1, dec!(200_000), PaymentMethod::BankTransfer)
            .unwrap();

        let account = engine.account(1).unwrap();
        assert_eq!(account.balance, Decimal::ZERO);

        let approved = engine.approve_deposit(&admin(), request.id).unwrap();
        assert_eq!(approved.status, DepositStatus::Completed);
        assert_eq!(approved.approved_by, Some(1));

        let account = engine.account(1).unwrap();
        assert_eq!(account.balance, dec!(200_000));
        assert_eq!(account.deposited_total, dec!(200_000));
    }

    #[test]
    fn deposit_below_minimum_is_rejected_at_creation() {
        let (engine, _) = engine_at(0);
        let result = engine.create_deposit(1, dec!(49_999), PaymentMethod::BankTransfer);
        assert_eq!(
            result,
            Err(LedgerError::amount_too_low(dec!(49_999), dec!(50_000)))
        );
    }

    #[test]
    fn deposit_approval_requires_the_capability() {
        let (engine, _) = engine_at(0);
        let request = engine
            .create_deposit(1, dec!(50_000), PaymentMethod::BankTransfer)
            .unwrap();

        let support = Actor::admin(2, AdminRole::Support);
        assert!(matches!(
            engine.approve_deposit(&support, request.id),
            Err(LedgerError::Unauthorized { .. })
        ));
        assert!(matches!(
            engine.approve_deposit(&Actor::owner(1), request.id),
            Err(LedgerError::Unauthorized { .. })
        ));
    }

    #[test]
    fn decided_deposits_cannot_be_decided_again() {
        let (engine, _) = engine_at(0);
        let request = engine
            .create_deposit(1, dec!(50_000), PaymentMethod::BankTransfer)
            .unwrap();
        engine.approve_deposit(&admin(), request.id).unwrap();

        assert_eq!(
            engine.approve_deposit(&admin(), request.id),
            Err(LedgerError::invalid_state(request.id, "completed"))
        );
        assert_eq!(
            engine.reject_deposit(&admin(), request.id, "too late"),
            Err(LedgerError::invalid_state(request.id, "completed"))
        );

        // exactly one credit landed
        assert_eq!(engine.account(1).unwrap().balance, dec!(50_000));
    }

    #[test]
    fn deposit_rejection_needs_a_reason_and_moves_no_funds() {
        let (engine, _) = engine_at(0);
        let request = engine
            .create_deposit(1, dec!(80_000), PaymentMethod::BankTransfer)
            .unwrap();

        assert_eq!(
            engine.reject_deposit(&admin(), request.id, "   "),
            Err(LedgerError::missing_reason(request.id))
        );

        let rejected = engine
            .reject_deposit(&admin(), request.id, "unverifiable transfer")
            .unwrap();
        assert_eq!(rejected.status, DepositStatus::Failed);
        assert_eq!(
            rejected.rejection_reason.as_deref(),
            Some("unverifiable transfer")
        );
        assert_eq!(engine.account(1).unwrap().balance, Decimal::ZERO);
    }

    #[test]
    fn only_the_owner_cancels_a_deposit() {
        let (engine, _) = engine_at(0);
        let request = engine
            .create_deposit(1, dec!(50_000), PaymentMethod::BankTransfer)
            .unwrap();

        assert!(matches!(
            engine.cancel_deposit(&Actor::owner(2), request.id),
            Err(LedgerError::Unauthorized { .. })
        ));
        assert!(matches!(
            engine.cancel_deposit(&admin(), request.id),
            Err(LedgerError::Unauthorized { .. })
        ));

        let cancelled = engine.cancel_deposit(&Actor::owner(1), request.id).unwrap();
        assert_eq!(cancelled.status, DepositStatus::Cancelled);
    }

    #[test]
    fn withdrawal_creation_checks_threshold_before_the_amount_window() {
        let (engine, _) = engine_at(0);
        engine.accounts().get_or_create(1);

        // both the threshold and the window fail; the threshold wins
        let result = engine.create_withdrawal(1, dec!(10), BankDetails::default());
        assert_eq!(
            result,
            Err(LedgerError::deposit_threshold_not_met(dec!(0), dec!(50_000)))
        );
    }

    #[test]
    fn withdrawal_creation_validates_without_moving_funds() {
        let (engine, _) = engine_at(0);
        funded_account(&engine, 1, dec!(500_000));

        assert_eq!(
            engine.create_withdrawal(1, dec!(99_999), BankDetails::default()),
            Err(LedgerError::amount_out_of_range(
                dec!(99_999),
                dec!(100_000),
                dec!(5_000_000)
            ))
        );
        assert_eq!(
            engine.create_withdrawal(1, dec!(500_001), BankDetails::default()),
            Err(LedgerError::insufficient_funds(1, dec!(500_000), dec!(500_001)))
        );

        let request = engine
            .create_withdrawal(1, dec!(150_000), BankDetails::default())
            .unwrap();
        assert_eq!(request.status, WithdrawStatus::Pending);
        assert_eq!(engine.account(1).unwrap().balance, dec!(500_000));
    }

    #[test]
    fn withdrawal_for_unknown_account_is_not_found() {
        let (engine, _) = engine_at(0);
        assert_eq!(
            engine.create_withdrawal(9, dec!(100_000), BankDetails::default()),
            Err(LedgerError::account_not_found(9))
        );
    }

    #[test]
    fn completed_withdrawal_leaves_the_ledger_untouched() {
        let (engine, _) = engine_at(0);
        funded_account(&engine, 1, dec!(500_000));
        let request = engine
            .create_withdrawal(1, dec!(150_000), BankDetails::default())
            .unwrap();

        engine.approve_withdrawal(&admin(), request.id).unwrap();
        let completed = engine
            .complete_withdrawal(&admin(), request.id, Some("TXN-441".to_string()))
            .unwrap();

        assert_eq!(completed.status, WithdrawStatus::Completed);
        assert_eq!(completed.external_txn.as_deref(), Some("TXN-441"));
        assert_eq!(engine.account(1).unwrap().balance, dec!(500_000));
    }

    #[test]
    fn completion_requires_the_processing_state() {
        let (engine, _) = engine_at(0);
        funded_account(&engine, 1, dec!(500_000));
        let request = engine
            .create_withdrawal(1, dec!(150_000), BankDetails::default())
            .unwrap();

        assert_eq!(
            engine.complete_withdrawal(&admin(), request.id, None),
            Err(LedgerError::invalid_state(request.id, "pending"))
        );
    }

    #[test]
    fn rejected_withdrawal_refunds_commission_first() {
        let (engine, _) = engine_at(0);
        funded_account(&engine, 1, dec!(500_000));
        engine.credit(1, dec!(2_000), Pool::Commission).unwrap();

        let request = engine
            .create_withdrawal(1, dec!(150_000), BankDetails::default())
            .unwrap();
        engine.approve_withdrawal(&admin(), request.id).unwrap();

        let rejected = engine
            .reject_withdrawal(&admin(), request.id, "bank details invalid")
            .unwrap();
        assert_eq!(rejected.status, WithdrawStatus::Failed);

        // refund split: min(150_000, 2_000) to commission, the rest to balance
        let account = engine.account(1).unwrap();
        assert_eq!(account.commission, dec!(4_000));
        assert_eq!(account.balance, dec!(648_000));
    }

    #[test]
    fn rejection_from_terminal_states_is_refused() {
        let (engine, _) = engine_at(0);
        funded_account(&engine, 1, dec!(500_000));
        let request = engine
            .create_withdrawal(1, dec!(150_000), BankDetails::default())
            .unwrap();
        engine
            .cancel_withdrawal(&Actor::owner(1), request.id)
            .unwrap();

        assert_eq!(
            engine.reject_withdrawal(&admin(), request.id, "late"),
            Err(LedgerError::invalid_state(request.id, "cancelled"))
        );
    }

    #[test]
    fn owners_cannot_cancel_a_processing_withdrawal() {
        let (engine, _) = engine_at(0);
        funded_account(&engine, 1, dec!(500_000));
        let request = engine
            .create_withdrawal(1, dec!(150_000), BankDetails::default())
            .unwrap();
        engine.approve_withdrawal(&admin(), request.id).unwrap();

        assert_eq!(
            engine.cancel_withdrawal(&Actor::owner(1), request.id),
            Err(LedgerError::invalid_state(request.id, "processing"))
        );
    }

    #[test]
    fn task_completion_credits_the_level_rate() {
        let (engine, _) = engine_at(0);
        engine.accounts().get_or_create(1);

        let completion = engine
            .complete_task(&Actor::owner(1), 1, Platform::Shopee, 1)
            .unwrap();
        assert_eq!(completion.commission, dec!(1_500));

        let account = engine.account(1).unwrap();
        assert_eq!(account.commission, dec!(1_500));
        assert_eq!(account.tasks_completed, 1);
        assert_eq!(engine.requests().tasks_for(1).len(), 1);
    }

    #[test]
    fn tasks_are_owner_only() {
        let (engine, _) = engine_at(0);
        engine.accounts().get_or_create(1);

        assert!(matches!(
            engine.complete_task(&admin(), 1, Platform::Shopee, 1),
            Err(LedgerError::Unauthorized { .. })
        ));
        assert!(matches!(
            engine.complete_task(&Actor::owner(2), 1, Platform::Shopee, 1),
            Err(LedgerError::Unauthorized { .. })
        ));
    }

    #[test]
    fn task_level_must_be_unlocked() {
        let (engine, _) = engine_at(0);
        engine.accounts().get_or_create(1);

        assert_eq!(
            engine.complete_task(&Actor::owner(1), 1, Platform::Shopee, 3),
            Err(LedgerError::level_too_low(1, 1, 3))
        );
        assert_eq!(
            engine.complete_task(&Actor::owner(1), 1, Platform::Shopee, 6),
            Err(LedgerError::invalid_level(6))
        );
    }

    #[test]
    fn cooldown_blocks_the_same_tuple_within_the_window() {
        let (engine, clock) = engine_at(0);
        engine.accounts().get_or_create(1);
        let owner = Actor::owner(1);

        engine
            .complete_task(&owner, 1, Platform::Shopee, 1)
            .unwrap();

        clock.set_secs(23 * HOUR);
        let result = engine.complete_task(&owner, 1, Platform::Shopee, 1);
        assert!(matches!(result, Err(LedgerError::CooldownActive { .. })));

        // a different platform or level is a different tuple
        engine
            .complete_task(&owner, 1, Platform::Lazada, 1)
            .unwrap();

        clock.set_secs(24 * HOUR);
        engine
            .complete_task(&owner, 1, Platform::Shopee, 1)
            .unwrap();
        assert_eq!(engine.account(1).unwrap().tasks_completed, 3);
    }

    #[test]
    fn level_and_status_administration_needs_manage_accounts() {
        let (engine, _) = engine_at(0);
        engine.accounts().get_or_create(1);

        let moderator = Actor::admin(3, AdminRole::Moderator);
        assert!(matches!(
            engine.set_account_level(&moderator, 1, 3),
            Err(LedgerError::Unauthorized { .. })
        ));

        engine.set_account_level(&admin(), 1, 3).unwrap();
        engine
            .set_account_status(&admin(), 1, AccountStatus::Suspended)
            .unwrap();

        let account = engine.account(1).unwrap();
        assert_eq!(account.level, 3);
        assert_eq!(account.status, AccountStatus::Suspended);

        // a raised level unlocks higher tasks
        engine
            .complete_task(&Actor::owner(1), 1, Platform::Tiki, 3)
            .unwrap();
        assert_eq!(engine.account(1).unwrap().commission, dec!(3_300));
    }

    #[test]
    fn eligibility_report_reflects_the_account() {
        let (engine, _) = engine_at(0);
        engine.accounts().get_or_create(1);

        let report = engine.withdraw_eligibility(1).unwrap();
        assert!(!report.eligible);
        assert_eq!(report.reasons.len(), 2);
        assert!(matches!(
            report.reasons[0],
            IneligibilityReason::DepositThresholdNotMet { .. }
        ));

        funded_account(&engine, 1, dec!(500_000));
        let report = engine.withdraw_eligibility(1).unwrap();
        assert!(report.eligible);
        assert_eq!(report.max_withdraw, dec!(500_000));

        assert_eq!(
            engine.withdraw_eligibility(9),
            Err(LedgerError::account_not_found(9))
        );
    }

    fn record(kind: OpKind, account: AccountId) -> OperationRecord {
        OperationRecord {
            kind,
            account,
            actor: ActorSpec::Owner,
            request: None,
            amount: None,
            platform: None,
            level: None,
            at: 0,
            note: None,
        }
    }

    #[test]
    fn apply_rejects_rows_missing_required_columns() {
        let (engine, _) = engine_at(0);

        assert_eq!(
            engine.apply(&record(OpKind::DepositRequest, 1)),
            Err(LedgerError::missing_field("deposit-request", "amount"))
        );
        assert_eq!(
            engine.apply(&record(OpKind::DepositApprove, 1)),
            Err(LedgerError::missing_field("deposit-approve", "request id"))
        );
        assert_eq!(
            engine.apply(&record(OpKind::TaskComplete, 1)),
            Err(LedgerError::missing_field("task-complete", "platform"))
        );
    }

    #[test]
    fn apply_routes_credit_to_the_pool_named_in_the_note() {
        let (engine, _) = engine_at(0);

        let mut credit = record(OpKind::Credit, 1);
        credit.amount = Some(dec!(10_000));
        engine.apply(&credit).unwrap();

        credit.note = Some("commission".to_string());
        credit.amount = Some(dec!(2_000));
        engine.apply(&credit).unwrap();

        let account = engine.account(1).unwrap();
        assert_eq!(account.balance, dec!(10_000));
        assert_eq!(account.commission, dec!(2_000));
        assert_eq!(account.deposited_total, Decimal::ZERO);
    }

    #[test]
    fn apply_drives_a_full_deposit_lifecycle() {
        let (engine, _) = engine_at(0);

        let mut create = record(OpKind::DepositRequest, 1);
        create.amount = Some(dec!(120_000));
        engine.apply(&create).unwrap();

        let mut approve = record(OpKind::DepositApprove, 1);
        approve.actor = ActorSpec::Admin(AdminRole::Moderator);
        approve.request = Some(1);
        engine.apply(&approve).unwrap();

        let account = engine.account(1).unwrap();
        assert_eq!(account.balance, dec!(120_000));
        assert_eq!(account.deposited_total, dec!(120_000));
    }
}
