//! Rewards Ledger Engine Library
//! # Overview
//!
//! This library provides a streaming CSV-based replay engine for a rewards
//! platform ledger, implementing both a sync and an async strategy.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Account, requests, operations, actors)
//! - [`config`] - Business limits and thresholds
//! - [`cli`] - CLI argument parsing
//! - [`core`] - Business logic components:
//!   - [`core::engine`] - Ledger operation orchestration
//!   - [`core::accounts`] - Account state and the two currency pools
//!   - [`core::requests`] - Deposit/withdrawal requests and task history
//!   - [`core::eligibility`] - Withdrawal eligibility policy
//!   - [`core::levels`] - Level requirements and commission rates
//! - [`io`] - CSV reading and account-table output
//! - [`strategy`] - Pluggable replay strategies
//!
//! # Ledger Model
//!
//! Each account holds two pools, `balance` and `commission`, whose sum is the
//! account's total. Deposits enter the ledger through a request that an admin
//! approves; withdrawals reserve nothing up front and only move funds when a
//! processing request is rejected (refund). Task completions pay a fixed
//! commission per level, limited to one completion per (account, platform,
//! level) each cooldown window.
//!
//! # Replay
//!
//! Operations arrive as CSV rows with a simulated timestamp. The engine runs
//! against an injected [`core::clock::Clock`], so replays are deterministic
//! regardless of wall time.

// Module declarations
pub mod cli;
pub mod config;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use crate::core::{
    check_withdraw_eligibility, AccountStore, BatchConfig, BatchProcessor, LedgerEngine,
    RequestStore,
};
pub use crate::core::{Clock, SimClock, SystemClock};
pub use config::LedgerConfig;
pub use io::write_accounts_csv;
pub use types::{
    Account, AccountId, AccountStatus, Actor, ActorSpec, AdminRole, Capability, DepositRequest,
    LedgerError, OpKind, OperationRecord, Platform, RequestId, WithdrawRequest,
};
