//! Asynchronous CSV reader with stream interface
//!
//! Provides a streaming interface over replay operation records from a CSV
//! file. Supports batch reading for efficient async processing.
//!
//! # Design
//!
//! The AsyncReader uses:
//! - csv-async for streaming CSV parsing
//! - tokio for async runtime and concurrency primitives
//! - Batch reading for efficient processing
//!
//! Rows that fail to parse are skipped with a warning so one malformed line
//! does not abort a replay.

use crate::io::csv_format::{convert_csv_operation, CsvOperation};
use crate::types::OperationRecord;
use csv_async::{AsyncReaderBuilder, Trim};
use futures::io::AsyncRead;
use futures::stream::StreamExt;

/// Asynchronous CSV reader
///
/// Provides a batch reading interface over operation records.
/// Maintains streaming behavior with constant memory usage.
pub struct AsyncReader<R: AsyncRead + Unpin> {
    reader: csv_async::AsyncDeserializer<R>,
    line_num: usize,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncReader<R> {
    /// Create a new AsyncReader from an async readable source
    ///
    /// The reader is configured to trim whitespace and allow flexible field
    /// counts, matching the synchronous reader.
    pub fn new(source: R) -> Self {
        let reader = AsyncReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .create_deserializer(source);

        Self {
            reader,
            line_num: 0,
        }
    }

    /// Read up to `batch_size` operation records
    ///
    /// Malformed rows are logged and skipped, so the returned batch holds
    /// only records that parsed cleanly. An empty vector means end of input.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<OperationRecord> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut records = self.reader.deserialize::<CsvOperation>();

        while batch.len() < batch_size {
            match records.next().await {
                Some(Ok(row)) => {
                    self.line_num += 1;
                    match convert_csv_operation(row) {
                        Ok(record) => batch.push(record),
                        Err(e) => {
                            // line_num + 1 accounts for the header row
                            tracing::warn!("Line {}: {}", self.line_num + 1, e);
                        }
                    }
                }
                Some(Err(e)) => {
                    self.line_num += 1;
                    tracing::warn!("Line {}: CSV parse error: {}", self.line_num + 1, e);
                }
                None => break,
            }
        }

        batch
    }
}
