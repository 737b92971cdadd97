//! Synchronous CSV reader with iterator interface
//!
//! Provides a streaming iterator over replay operation records from a CSV
//! file. Delegates CSV format concerns to the csv_format module.
//!
//! # Design
//!
//! The SyncReader uses csv::Reader to read and deserialize rows sequentially,
//! delegating parsing and conversion to the csv_format module. It maintains
//! streaming behavior by processing rows one at a time without loading the
//! entire file into memory.
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()`
//! - Individual row parsing errors are yielded as Err variants in the
//!   iterator, with line numbers for debugging

use crate::io::csv_format::{convert_csv_operation, CsvOperation};
use crate::types::OperationRecord;
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::path::Path;

/// Synchronous CSV reader
///
/// Provides an iterator interface over replay operation records. Maintains
/// streaming behavior with constant memory usage.
///
/// # Examples
///
/// ```no_run
/// use rewards_ledger_engine::io::sync_reader::SyncReader;
/// use std::path::Path;
///
/// let reader = SyncReader::new(Path::new("operations.csv")).unwrap();
/// let records: Vec<_> = reader.filter_map(Result::ok).collect();
/// println!("Successfully parsed {} operations", records.len());
/// ```
#[derive(Debug)]
pub struct SyncReader {
    reader: csv::Reader<File>,
    line_num: usize,
}

impl SyncReader {
    /// Create a new SyncReader from a file path
    ///
    /// The CSV reader is configured to trim whitespace, allow flexible field
    /// counts (trailing optional columns may be omitted) and use an 8KB
    /// buffer.
    ///
    /// # Errors
    ///
    /// A message naming the file if it cannot be opened.
    pub fn new(path: &Path) -> Result<Self, String> {
        let file = File::open(path)
            .map_err(|e| format!("Failed to open file '{}': {}", path.display(), e))?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);

        Ok(Self {
            reader,
            line_num: 0,
        })
    }
}

impl Iterator for SyncReader {
    type Item = Result<OperationRecord, String>;

    /// Get the next operation record from the CSV file
    ///
    /// # Returns
    ///
    /// * `Some(Ok(OperationRecord))` - Successfully parsed row
    /// * `Some(Err(String))` - Parse or conversion error with line number
    /// * `None` - End of file reached
    fn next(&mut self) -> Option<Self::Item> {
        let mut deserializer = self.reader.deserialize::<CsvOperation>();

        match deserializer.next()? {
            Ok(row) => {
                self.line_num += 1;
                // line_num + 1 accounts for the header row
                Some(
                    convert_csv_operation(row)
                        .map_err(|e| format!("Line {}: {}", self.line_num + 1, e)),
                )
            }
            Err(e) => {
                self.line_num += 1;
                Some(Err(format!(
                    "Line {}: CSV parse error: {}",
                    self.line_num + 1,
                    e
                )))
            }
        }
    }
}
