//! Asynchronous batch processing strategy
//!
//! Multi-threaded implementation of the ProcessingStrategy trait. Operations
//! are read in batches and partitioned by account for parallel replay.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_batches)
//!     ├── AsyncReader (batch CSV reading)
//!     └── BatchProcessor (account partitioning + tokio tasks)
//!         └── LedgerEngine (shared DashMap-backed state)
//! ```
//!
//! # Ordering
//!
//! Batches are processed sequentially to keep per-account ordering across the
//! entire file. Within each batch, different accounts replay in parallel while
//! each account's operations stay in file order.

use crate::core::{BatchConfig, BatchProcessor, LedgerEngine};
use crate::io::async_reader::AsyncReader;
use crate::io::csv_format::write_accounts_csv;
use crate::strategy::ProcessingStrategy;
use std::io::Write;
use std::path::Path;

/// Asynchronous batch processing strategy
///
/// Reads operations in batches and replays different accounts in parallel
/// on a tokio multi-threaded runtime. State is shared through the engine's
/// DashMap-backed stores, so all partitions mutate the same ledger.
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    config: BatchConfig,
}

impl AsyncProcessingStrategy {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    /// Replay operations from the input file and write the account table
    ///
    /// Fatal errors (file not found, I/O errors, runtime errors) are returned
    /// immediately. Individual record failures are logged and replay continues.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_batches)
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        runtime.block_on(async {
            let engine = LedgerEngine::new();
            let processor = BatchProcessor::new(engine.clone());

            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| format!("Failed to open file '{}': {}", input_path.display(), e))?;

            // Wrap tokio file in a compatibility layer for csv-async
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncReader::new(compat_file);

            // Process batches sequentially so an account whose operations
            // span multiple batches still replays them in file order.
            loop {
                let batch = reader.read_batch(self.config.batch_size).await;
                if batch.is_empty() {
                    break;
                }

                let results = processor.process_batch(batch).await;
                for failed in results.iter().filter(|r| r.result.is_err()) {
                    if let Err(e) = &failed.result {
                        tracing::warn!(
                            op = %failed.record.kind,
                            account = failed.record.account,
                            "Operation failed: {}",
                            e
                        );
                    }
                }
            }

            let accounts = engine.accounts().snapshot();
            write_accounts_csv(&accounts, output).map_err(|e| e.to_string())?;

            Ok(())
        })
    }
}
