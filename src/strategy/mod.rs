//! Processing strategy module for ledger replay
//!
//! This module defines the Strategy pattern for complete replay pipelines,
//! encompassing both CSV parsing and ledger engine processing. This allows
//! different implementations (synchronous, asynchronous batch) to be selected
//! at runtime.

use crate::cli::StrategyType;
use crate::core::BatchConfig;
use std::io::Write;
use std::path::Path;

pub mod r#async;
pub mod sync;

pub use self::r#async::AsyncProcessingStrategy;
pub use sync::SyncProcessingStrategy;

/// Processing strategy trait for complete replay pipelines
///
/// Each strategy reads operation records from a CSV file, applies them to a
/// ledger engine under a simulated clock, and writes the final account table
/// to output.
pub trait ProcessingStrategy: Send + Sync {
    /// Replay operations from the input file and write the account table
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input file cannot be opened
    /// - A fatal I/O error occurs during reading or writing
    ///
    /// Individual operation failures are logged and do not cause this method
    /// to return an error. Processing continues with the next record.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String>;
}

/// Create a processing strategy based on the specified strategy type
///
/// Factory selecting the strategy implementation at runtime. The batch
/// configuration only applies to the async strategy and is ignored for sync.
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy),
        StrategyType::Async => {
            let config = config.unwrap_or_default();
            Box::new(AsyncProcessingStrategy::new(config))
        }
    }
}
