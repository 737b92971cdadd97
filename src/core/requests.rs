//! Thread-safe storage for deposit/withdrawal requests and task completions
//!
//! This module provides the `RequestStore` struct, the audit side of the
//! ledger: every request and task completion ever made is retained here, and
//! request state transitions run under the request's entry lock.
//!
//! # Design
//!
//! Requests are append-mostly: they are inserted `pending` and mutated
//! exactly once into a terminal state via [`RequestStore::update_deposit`] /
//! [`RequestStore::update_withdrawal`], whose closures execute while the
//! DashMap entry lock is held. The engine keeps that guard across the
//! matching account mutation so a transition and its ledger effect commit as
//! one unit.
//!
//! IDs come from a single atomic sequence shared by deposits, withdrawals
//! and task completions, so an ID is unique across all record kinds and
//! reflects global creation order.

use crate::types::{
    AccountId, DepositRequest, DepositStatus, LedgerError, Platform, RequestId, TaskCompletion,
    WithdrawRequest, WithdrawStatus,
};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};

/// Count and summed amount of one status bucket of an account's requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RequestStats {
    /// Number of requests in the bucket
    pub count: usize,
    /// Sum of the request amounts in the bucket
    pub total: Decimal,
}

/// Thread-safe store of request and task-completion records
///
/// # Thread Safety
///
/// All methods are safe to call concurrently. Operations on different
/// requests never block each other; transitions of the same request are
/// serialized by its entry lock.
#[derive(Debug, Default)]
pub struct RequestStore {
    /// Next ID handed out by [`RequestStore::next_id`]
    sequence: AtomicU64,

    /// Deposit requests by request ID
    deposits: DashMap<RequestId, DepositRequest>,

    /// Withdrawal requests by request ID
    withdrawals: DashMap<RequestId, WithdrawRequest>,

    /// Task completions per account, in completion order
    tasks: DashMap<AccountId, Vec<TaskCompletion>>,
}

impl RequestStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            sequence: AtomicU64::new(1),
            deposits: DashMap::new(),
            withdrawals: DashMap::new(),
            tasks: DashMap::new(),
        }
    }

    /// Next ID from the shared sequence
    ///
    /// IDs start at 1 and follow global creation order across deposits,
    /// withdrawals and task completions.
    pub fn next_id(&self) -> RequestId {
        self.sequence.fetch_add(1, Ordering::SeqCst)
    }

    /// Insert a freshly created deposit request
    pub fn insert_deposit(&self, request: DepositRequest) {
        self.deposits.insert(request.id, request);
    }

    /// Insert a freshly created withdrawal request
    pub fn insert_withdrawal(&self, request: WithdrawRequest) {
        self.withdrawals.insert(request.id, request);
    }

    /// Snapshot of a deposit request, if it exists
    pub fn get_deposit(&self, id: RequestId) -> Option<DepositRequest> {
        self.deposits.get(&id).map(|entry| entry.clone())
    }

    /// Snapshot of a withdrawal request, if it exists
    pub fn get_withdrawal(&self, id: RequestId) -> Option<WithdrawRequest> {
        self.withdrawals.get(&id).map(|entry| entry.clone())
    }

    /// Transition a deposit request under its entry lock
    ///
    /// The closure runs while the entry lock is held; the engine performs the
    /// matching account mutation inside it so the transition and the ledger
    /// effect are observed together or not at all. On success the updated
    /// request is returned as a snapshot.
    ///
    /// # Errors
    ///
    /// [`LedgerError::RequestNotFound`] for unknown IDs, otherwise whatever
    /// the closure returns (the closure must not mutate on its error paths).
    pub fn update_deposit<F>(&self, id: RequestId, f: F) -> Result<DepositRequest, LedgerError>
    where
        F: FnOnce(&mut DepositRequest) -> Result<(), LedgerError>,
    {
        let mut entry = self
            .deposits
            .get_mut(&id)
            .ok_or_else(|| LedgerError::request_not_found(id))?;
        f(entry.value_mut())?;
        Ok(entry.clone())
    }

    /// Transition a withdrawal request under its entry lock
    ///
    /// Same contract as [`RequestStore::update_deposit`].
    pub fn update_withdrawal<F>(&self, id: RequestId, f: F) -> Result<WithdrawRequest, LedgerError>
    where
        F: FnOnce(&mut WithdrawRequest) -> Result<(), LedgerError>,
    {
        let mut entry = self
            .withdrawals
            .get_mut(&id)
            .ok_or_else(|| LedgerError::request_not_found(id))?;
        f(entry.value_mut())?;
        Ok(entry.clone())
    }

    /// Deposit requests of an account, newest first
    pub fn deposits_for(&self, account: AccountId) -> Vec<DepositRequest> {
        let mut requests: Vec<DepositRequest> = self
            .deposits
            .iter()
            .filter(|entry| entry.account == account)
            .map(|entry| entry.clone())
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        requests
    }

    /// Withdrawal requests of an account, newest first
    pub fn withdrawals_for(&self, account: AccountId) -> Vec<WithdrawRequest> {
        let mut requests: Vec<WithdrawRequest> = self
            .withdrawals
            .iter()
            .filter(|entry| entry.account == account)
            .map(|entry| entry.clone())
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        requests
    }

    /// Count and summed amount of an account's deposits in one status
    pub fn deposit_stats(&self, account: AccountId, status: DepositStatus) -> RequestStats {
        self.deposits
            .iter()
            .filter(|entry| entry.account == account && entry.status == status)
            .fold(RequestStats::default(), |stats, entry| RequestStats {
                count: stats.count + 1,
                total: stats.total + entry.amount,
            })
    }

    /// Count and summed amount of an account's withdrawals in one status
    pub fn withdraw_stats(&self, account: AccountId, status: WithdrawStatus) -> RequestStats {
        self.withdrawals
            .iter()
            .filter(|entry| entry.account == account && entry.status == status)
            .fold(RequestStats::default(), |stats, entry| RequestStats {
                count: stats.count + 1,
                total: stats.total + entry.amount,
            })
    }

    /// Append a task completion to an account's history
    pub fn record_task(&self, completion: TaskCompletion) {
        self.tasks
            .entry(completion.account)
            .or_default()
            .push(completion);
    }

    /// Task completions of an account, newest first
    pub fn tasks_for(&self, account: AccountId) -> Vec<TaskCompletion> {
        let mut completions = self
            .tasks
            .get(&account)
            .map(|entry| entry.clone())
            .unwrap_or_default();
        completions.sort_by(|a, b| b.completed_at.cmp(&a.completed_at).then(b.id.cmp(&a.id)));
        completions
    }

    /// Latest completion instant for an `(account, platform, level)` tuple
    ///
    /// Anchors the cooldown window; `None` means the tuple has never been
    /// completed.
    pub fn last_task_completion(
        &self,
        account: AccountId,
        platform: Platform,
        level: u8,
    ) -> Option<DateTime<Utc>> {
        self.tasks.get(&account).and_then(|entry| {
            entry
                .iter()
                .filter(|task| task.platform == platform && task.level == level)
                .map(|task| task.completed_at)
                .max()
        })
    }
}
