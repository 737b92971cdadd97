//! Synchronous processing strategy
//!
//! Single-threaded implementation of the ProcessingStrategy trait. It
//! orchestrates replay by coordinating between the SyncReader (CSV input)
//! and the LedgerEngine (business logic).
//!
//! # Design
//!
//! The SyncProcessingStrategy focuses on orchestration, delegating:
//! - CSV parsing to `SyncReader` (iterator interface)
//! - Operation semantics to `LedgerEngine`
//! - CSV output to `csv_format::write_accounts_csv`
//!
//! # Memory Efficiency
//!
//! This strategy maintains streaming behavior: records are processed one at
//! a time, so memory usage is O(accounts + requests), not O(all operations).

use crate::core::clock::SimClock;
use crate::core::LedgerEngine;
use crate::io::csv_format::write_accounts_csv;
use crate::io::sync_reader::SyncReader;
use crate::strategy::ProcessingStrategy;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Synchronous processing strategy
///
/// Replays operations in file order on a single thread. Each record's
/// timestamp drives a simulated clock before the record is applied, so
/// time-dependent rules (task cooldowns, audit stamps) see replay time
/// rather than wall time.
///
/// # Examples
///
/// ```no_run
/// use rewards_ledger_engine::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use std::path::Path;
/// use std::io;
///
/// let strategy = SyncProcessingStrategy;
/// let mut output = io::stdout();
///
/// strategy.process(Path::new("operations.csv"), &mut output)
///     .expect("Replay failed");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SyncProcessingStrategy;

impl ProcessingStrategy for SyncProcessingStrategy {
    /// Replay operations from the input file and write the account table
    ///
    /// Fatal errors (file not found, I/O errors) are returned immediately.
    /// Individual record failures are logged and processing continues.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let clock = Arc::new(SimClock::new());
        let engine = LedgerEngine::new().with_clock(clock.clone());

        let reader = SyncReader::new(input_path)?;

        for result in reader {
            match result {
                Ok(record) => {
                    clock.set_secs(record.at);
                    if let Err(e) = engine.apply(&record) {
                        tracing::warn!(
                            op = %record.kind,
                            account = record.account,
                            "Operation failed: {}",
                            e
                        );
                    }
                }
                Err(e) => {
                    tracing::warn!("Skipping malformed row: {}", e);
                }
            }
        }

        let accounts = engine.accounts().snapshot();
        write_accounts_csv(&accounts, output).map_err(|e| e.to_string())?;

        Ok(())
    }
}
