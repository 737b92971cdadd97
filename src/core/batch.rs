//! Concurrent batch processing of replay operations
//!
//! Splits a batch of operation records by account so independent accounts
//! replay in parallel while each account's operations stay in file order.
//! Every partition runs against its own simulated clock, advanced to each
//! record's timestamp before the record is applied.

use crate::core::clock::SimClock;
use crate::core::engine::LedgerEngine;
use crate::types::{AccountId, LedgerError, OperationRecord};
use std::collections::HashMap;
use std::sync::Arc;

/// Configuration for batch processing
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Number of records read from the input per batch
    pub batch_size: usize,
    /// Maximum number of account partitions processed concurrently
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a config, falling back to defaults for zero values
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let defaults = Self::default();

        let batch_size = if batch_size == 0 {
            tracing::warn!(
                "batch_size of 0 is invalid, using default of {}",
                defaults.batch_size
            );
            defaults.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            tracing::warn!(
                "max_concurrent_batches of 0 is invalid, using default of {}",
                defaults.max_concurrent_batches
            );
            defaults.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
        }
    }
}

/// Outcome of applying a single operation record
#[derive(Debug)]
pub struct ApplyResult {
    pub record: OperationRecord,
    pub result: Result<(), LedgerError>,
}

/// Processes operation batches with per-account parallelism
///
/// The engine is cloned per partition; clones share the underlying account
/// and request stores, so all partitions mutate the same ledger state.
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    engine: LedgerEngine,
}

impl BatchProcessor {
    pub fn new(engine: LedgerEngine) -> Self {
        Self { engine }
    }

    /// Group records by account, preserving per-account file order
    fn partition_by_account(
        records: Vec<OperationRecord>,
    ) -> HashMap<AccountId, Vec<OperationRecord>> {
        let mut partitions: HashMap<AccountId, Vec<OperationRecord>> = HashMap::new();
        for record in records {
            partitions.entry(record.account).or_default().push(record);
        }
        partitions
    }

    /// Apply one account's operations sequentially under a simulated clock
    fn process_account_operations(
        engine: LedgerEngine,
        records: Vec<OperationRecord>,
    ) -> Vec<ApplyResult> {
        let clock = Arc::new(SimClock::new());
        let engine = engine.with_clock(clock.clone());

        records
            .into_iter()
            .map(|record| {
                clock.set_secs(record.at);
                let result = engine.apply(&record);
                ApplyResult { record, result }
            })
            .collect()
    }

    /// Process a batch of records, accounts in parallel
    ///
    /// Spawns one task per account partition and waits for all of them.
    /// Results are returned for the caller to report; a failed record never
    /// aborts the batch.
    pub async fn process_batch(&self, records: Vec<OperationRecord>) -> Vec<ApplyResult> {
        let partitions = Self::partition_by_account(records);

        let mut tasks = Vec::with_capacity(partitions.len());
        for (_, account_records) in partitions {
            let engine = self.engine.clone();
            tasks.push(tokio::spawn(async move {
                Self::process_account_operations(engine, account_records)
            }));
        }

        let mut results = Vec::new();
        for task in tasks {
            match task.await {
                Ok(mut partition_results) => results.append(&mut partition_results),
                Err(e) => tracing::error!("Batch task panicked: {}", e),
            }
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActorSpec, OpKind};
    use rust_decimal_macros::dec;

    fn credit(account: AccountId, amount: rust_decimal::Decimal, at: i64) -> OperationRecord {
        OperationRecord {
            kind: OpKind::Credit,
            account,
            actor: ActorSpec::Owner,
            request: None,
            amount: Some(amount),
            platform: None,
            level: None,
            at,
            note: None,
        }
    }

    #[test]
    fn partitions_preserve_order_and_lose_nothing() {
        let records = vec![
            credit(1, dec!(100), 0),
            credit(2, dec!(200), 1),
            credit(1, dec!(300), 2),
            credit(3, dec!(400), 3),
            credit(1, dec!(500), 4),
        ];

        let partitions = BatchProcessor::partition_by_account(records);

        assert_eq!(partitions.len(), 3);
        assert_eq!(partitions[&1].len(), 3);
        assert_eq!(partitions[&2].len(), 1);
        assert_eq!(partitions[&3].len(), 1);

        let amounts: Vec<_> = partitions[&1].iter().map(|r| r.amount.unwrap()).collect();
        assert_eq!(amounts, vec![dec!(100), dec!(300), dec!(500)]);
    }

    #[test]
    fn partitioning_empty_batch_is_empty() {
        let partitions = BatchProcessor::partition_by_account(Vec::new());
        assert!(partitions.is_empty());
    }

    #[tokio::test]
    async fn batch_applies_credits_across_accounts() {
        let engine = LedgerEngine::new();
        let processor = BatchProcessor::new(engine.clone());

        let records = vec![
            credit(1, dec!(50_000), 0),
            credit(2, dec!(60_000), 0),
            credit(1, dec!(25_000), 10),
        ];

        let results = processor.process_batch(records).await;
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.result.is_ok()));

        assert_eq!(engine.account(1).unwrap().balance, dec!(75_000));
        assert_eq!(engine.account(2).unwrap().balance, dec!(60_000));
    }

    #[tokio::test]
    async fn failed_record_does_not_abort_batch() {
        let engine = LedgerEngine::new();
        let processor = BatchProcessor::new(engine.clone());

        let records = vec![
            credit(1, dec!(50_000), 0),
            // debit against an account with no funds
            OperationRecord {
                kind: OpKind::Debit,
                amount: Some(dec!(999_999)),
                ..credit(2, dec!(0), 1)
            },
            credit(3, dec!(70_000), 2),
        ];

        let results = processor.process_batch(records).await;
        assert_eq!(results.len(), 3);

        let failed: Vec<_> = results.iter().filter(|r| r.result.is_err()).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].record.account, 2);

        assert_eq!(engine.account(1).unwrap().balance, dec!(50_000));
        assert_eq!(engine.account(3).unwrap().balance, dec!(70_000));
    }

    #[tokio::test]
    async fn record_timestamps_drive_the_simulated_clock() {
        let engine = LedgerEngine::new();
        let processor = BatchProcessor::new(engine.clone());

        let records = vec![
            credit(1, dec!(500_000), 100),
            OperationRecord {
                kind: OpKind::TaskComplete,
                amount: None,
                platform: Some("shopee".parse().unwrap()),
                level: Some(1),
                ..credit(1, dec!(0), 200)
            },
        ];

        let results = processor.process_batch(records).await;
        assert!(results.iter().all(|r| r.result.is_ok()));

        let account = engine.account(1).unwrap();
        assert_eq!(account.commission, dec!(1_500));
        let tasks = engine.requests().tasks_for(1);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].completed_at.timestamp(), 200);
    }

    #[test]
    fn config_zero_values_fall_back_to_defaults() {
        let config = BatchConfig::new(0, 0);
        assert_eq!(config.batch_size, 1000);
        assert_eq!(config.max_concurrent_batches, num_cpus::get());

        let config = BatchConfig::new(500, 2);
        assert_eq!(config.batch_size, 500);
        assert_eq!(config.max_concurrent_batches, 2);
    }
}
