//! Record sources feeding the batch builder.
//!
//! A [`RecordSource`] yields one raw record per call, as a list of text
//! fields. The source does no field validation; short or garbled rows
//! travel through and get rejected by [`BetRecord::parse`] so that one
//! bad row never stops the run.
//!
//! [`BetRecord::parse`]: crate::protocol::BetRecord::parse

use std::path::Path;

use crate::error::Result;

/// Pull-based supplier of raw records.
pub trait RecordSource {
    /// Next raw record, or `None` once the source is exhausted.
    ///
    /// An `Err` means the source itself broke (file I/O, CSV framing)
    /// and aborts the run.
    fn next_record(&mut self) -> Result<Option<Vec<String>>>;
}

/// Source backed by an agency dataset file (CSV, no header row).
pub struct CsvSource {
    reader: csv::Reader<std::fs::File>,
}

impl CsvSource {
    /// Open a dataset file.
    ///
    /// The reader is flexible about field counts: rows of any width are
    /// handed to the caller as-is.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path.as_ref())?;
        Ok(Self { reader })
    }
}

impl RecordSource for CsvSource {
    fn next_record(&mut self) -> Result<Option<Vec<String>>> {
        let mut row = csv::StringRecord::new();
        if self.reader.read_record(&mut row)? {
            Ok(Some(row.iter().map(str::to_string).collect()))
        } else {
            Ok(None)
        }
    }
}

/// In-memory source for tests.
#[derive(Debug, Default)]
pub struct VecSource {
    rows: std::vec::IntoIter<Vec<String>>,
}

impl VecSource {
    /// Create a source that yields `rows` in order, then end-of-data.
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self {
            rows: rows.into_iter(),
        }
    }

    /// Convenience constructor from borrowed string slices.
    pub fn from_rows(rows: &[&[&str]]) -> Self {
        Self::new(
            rows.iter()
                .map(|row| row.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }
}

impl RecordSource for VecSource {
    fn next_record(&mut self) -> Result<Option<Vec<String>>> {
        Ok(self.rows.next())
    }
}
