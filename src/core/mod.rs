//! Core business logic module
//!
//! This module contains the core ledger components:
//! - `accounts` - Account storage and the pool ledger operations
//! - `requests` - Request and task-completion storage
//! - `engine` - Workflow orchestration over both stores
//! - `levels` - The level and commission-rate table
//! - `eligibility` - The withdrawal eligibility policy
//! - `clock` - Injectable time source
//! - `batch` - Concurrent batch replay over account partitions

pub mod accounts;
pub mod batch;
pub mod clock;
pub mod eligibility;
pub mod engine;
pub mod levels;
pub mod requests;

pub use accounts::AccountStore;
pub use batch::{BatchConfig, BatchProcessor};
pub use clock::{Clock, SimClock, SystemClock};
pub use eligibility::{check_withdraw_eligibility, EligibilityReport, IneligibilityReason};
pub use engine::LedgerEngine;
pub use levels::{commission_rate, level_overview, LevelOverview, MAX_LEVEL, MIN_LEVEL};
pub use requests::{RequestStats, RequestStore};
