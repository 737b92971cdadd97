//! Thread-safe account storage and the ledger operations
//!
//! This module provides the `AccountStore` struct, which holds every account
//! and funnels all pool mutations through a per-account entry lock.
//!
//! # Design
//!
//! The store uses `DashMap` (a concurrent HashMap) for fine-grained locking:
//! operations on different accounts proceed in parallel, while operations on
//! the same account serialize on its entry. Every ledger mutation runs inside
//! [`AccountStore::update`]'s closure under that entry lock, so a concurrent
//! read-modify-write can never lose an update.
//!
//! # Thread Safety
//!
//! All methods are safe to call from multiple threads concurrently. There is
//! no global lock; the map's internal sharding is the only synchronization.

use crate::types::{Account, AccountId, AccountStatus, LedgerError, Pool};
use dashmap::DashMap;
use rust_decimal::Decimal;

use super::levels::{MAX_LEVEL, MIN_LEVEL};

/// Thread-safe store of account records
///
/// `AccountStore` is both the account record store (load, snapshot, field
/// updates) and the ledger: `credit`, `debit`, `refund` and `total_balance`
/// operate on the pools under the account's entry lock.
///
/// # Thread Safety
///
/// Multiple threads can safely operate on the store concurrently:
/// - operations on different accounts never block each other
/// - operations on the same account are serialized by the entry lock
/// - a reader sees either the state before or after a mutation, never a
///   partial one
#[derive(Debug, Default)]
pub struct AccountStore {
    /// Concurrent map of account records by account ID
    accounts: DashMap<AccountId, Account>,
}

impl AccountStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
        }
    }

    /// Get an existing account or create a fresh one
    ///
    /// Fresh accounts start with empty pools at level 1. The returned value
    /// is a snapshot; concurrent mutations won't be reflected in it.
    pub fn get_or_create(&self, account_id: AccountId) -> Account {
        self.accounts
            .entry(account_id)
            .or_insert_with(|| Account::new(account_id))
            .clone()
    }

    /// Snapshot of an account, if it exists
    pub fn get(&self, account_id: AccountId) -> Option<Account> {
        self.accounts.get(&account_id).map(|entry| entry.clone())
    }

    /// Mutate an account under its entry lock, creating it first if needed
    ///
    /// The closure runs while the entry lock is held, so no other thread can
    /// observe or interleave with a partial update. If the closure fails the
    /// error is returned as-is; the closure itself is responsible for not
    /// mutating on its failure paths (all [`Account`] pool operations are
    /// all-or-nothing). The closure's success value is passed through, so a
    /// caller can extract a consistent snapshot from inside the lock.
    ///
    /// # Errors
    ///
    /// Whatever the closure returns.
    pub fn update<T, F>(&self, account_id: AccountId, f: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut Account) -> Result<T, LedgerError>,
    {
        let mut entry = self
            .accounts
            .entry(account_id)
            .or_insert_with(|| Account::new(account_id));
        f(entry.value_mut())
    }

    /// Mutate an existing account under its entry lock
    ///
    /// Same contract as [`AccountStore::update`], but unknown accounts are an
    /// error instead of being created on the fly. Admin-driven updates use
    /// this form so a typo'd ID cannot materialize an account.
    ///
    /// # Errors
    ///
    /// [`LedgerError::AccountNotFound`] if the account does not exist,
    /// otherwise whatever the closure returns.
    pub fn update_existing<T, F>(&self, account_id: AccountId, f: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut Account) -> Result<T, LedgerError>,
    {
        let mut entry = self
            .accounts
            .get_mut(&account_id)
            .ok_or_else(|| LedgerError::account_not_found(account_id))?;
        f(entry.value_mut())
    }

    /// Credit the named pool of an account
    ///
    /// Creates the account if it does not exist yet, mirroring how deposits
    /// may target accounts the ledger has not seen. `deposited_total` is not
    /// touched; that bump belongs to deposit approval.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is not positive or the pool would
    /// overflow.
    pub fn credit(
        &self,
        account_id: AccountId,
        amount: Decimal,
        pool: Pool,
    ) -> Result<(), LedgerError> {
        self.update(account_id, |account| account.credit(pool, amount))
    }

    /// Debit an account's total holdings, commission first
    ///
    /// # Errors
    ///
    /// * [`LedgerError::AccountNotFound`] for unknown accounts
    /// * [`LedgerError::InsufficientFunds`] if the amount exceeds the total
    ///   holdings; nothing is mutated in that case
    pub fn debit(&self, account_id: AccountId, amount: Decimal) -> Result<(), LedgerError> {
        self.update_existing(account_id, |account| account.debit(amount))
    }

    /// Restore funds to an account, commission first
    ///
    /// # Errors
    ///
    /// * [`LedgerError::AccountNotFound`] for unknown accounts
    /// * an arithmetic error if a pool would overflow
    pub fn refund(&self, account_id: AccountId, amount: Decimal) -> Result<(), LedgerError> {
        self.update_existing(account_id, |account| account.refund(amount))
    }

    /// Total holdings of an account, `balance + commission`
    ///
    /// Pure read; the value is a snapshot and may be stale by the time the
    /// caller acts on it.
    ///
    /// # Errors
    ///
    /// [`LedgerError::AccountNotFound`] for unknown accounts.
    pub fn total_balance(&self, account_id: AccountId) -> Result<Decimal, LedgerError> {
        self.accounts
            .get(&account_id)
            .map(|account| account.total_balance())
            .ok_or_else(|| LedgerError::account_not_found(account_id))
    }

    /// Set an account's level
    ///
    /// This is the only path that moves a level; nothing in the workflows
    /// advances levels automatically.
    ///
    /// # Errors
    ///
    /// * [`LedgerError::InvalidLevel`] outside the 1-5 window
    /// * [`LedgerError::AccountNotFound`] for unknown accounts
    pub fn set_level(&self, account_id: AccountId, level: u8) -> Result<(), LedgerError> {
        if !(MIN_LEVEL..=MAX_LEVEL).contains(&level) {
            return Err(LedgerError::invalid_level(level));
        }
        self.update_existing(account_id, |account| {
            account.level = level;
            Ok(())
        })
    }

    /// Set an account's lifecycle status
    ///
    /// # Errors
    ///
    /// [`LedgerError::AccountNotFound`] for unknown accounts.
    pub fn set_status(
        &self,
        account_id: AccountId,
        status: AccountStatus,
    ) -> Result<(), LedgerError> {
        self.update_existing(account_id, |account| {
            account.status = status;
            Ok(())
        })
    }

    /// Snapshot of all accounts, sorted by account ID
    ///
    /// Sorting makes output deterministic for CSV generation. The snapshot
    /// is not a consistent cut across accounts; each record is consistent on
    /// its own.
    pub fn snapshot(&self) -> Vec<Account> {
        let mut accounts: Vec<Account> = self
            .accounts
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        accounts.sort_by_key(|account| account.id);
        accounts
    }

    /// Number of accounts in the store
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether the store holds no accounts
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
