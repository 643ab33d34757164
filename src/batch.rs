//! Batch assembly under record-count and byte caps.
//!
//! The builder pulls raw rows from a [`RecordSource`], parses them, and
//! closes the batch when the record cap is reached, when admitting the
//! next record would exceed the byte cap, or when the source ends. It
//! never peeks ahead: the final flag is set only once the source has
//! actually reported end-of-data, so a source holding an exact multiple
//! of the record cap ends with an empty final batch.
//!
//! Byte accounting uses [`BetRecord::encoded_len`], which matches the
//! encoder byte for byte, so a closed batch always fits the cap.

use std::sync::Arc;

use crate::error::{BetwireError, Result};
use crate::events::{EventSink, SessionEvent};
use crate::protocol::BetRecord;
use crate::source::RecordSource;

/// Details of a record refused for exceeding the byte cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverflowInfo {
    /// National id of the record that did not fit.
    pub national_id: u32,
    /// Wire size the record would have needed.
    pub record_len: usize,
    /// Bytes already committed to the batch when the record was refused.
    pub batch_bytes: usize,
}

/// One assembled batch, ready for transmission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// Records in source order.
    pub records: Vec<BetRecord>,
    /// Exact wire size of all records combined, header excluded.
    pub encoded_bytes: usize,
    /// True when the source ended while this batch was being built.
    pub is_final: bool,
    /// Set when a record was refused; the batch itself is still within
    /// the caps, the refused record is not part of it.
    pub overflow: Option<OverflowInfo>,
}

impl Batch {
    /// Record count as carried in the batch header.
    pub fn count(&self) -> u32 {
        self.records.len() as u32
    }

    /// True when the batch holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Assembles batches under the configured caps.
pub struct BatchBuilder {
    max_records: usize,
    max_bytes: usize,
    sink: Arc<dyn EventSink>,
}

impl BatchBuilder {
    /// Create a builder with the given caps.
    pub fn new(max_records: usize, max_bytes: usize, sink: Arc<dyn EventSink>) -> Self {
        Self {
            max_records,
            max_bytes,
            sink,
        }
    }

    /// Build the next batch from `source`.
    ///
    /// Malformed rows are skipped with a `RecordRejected` event and do
    /// not count toward the caps. A well-formed record that would push
    /// the batch past the byte cap closes the batch without it and marks
    /// the overflow; the caller decides the batch's fate. Source
    /// failures propagate.
    pub fn build_next(&self, source: &mut impl RecordSource) -> Result<Batch> {
        let mut batch = Batch {
            records: Vec::new(),
            encoded_bytes: 0,
            is_final: false,
            overflow: None,
        };

        while batch.records.len() < self.max_records {
            let Some(fields) = source.next_record()? else {
                batch.is_final = true;
                break;
            };

            let record = match BetRecord::parse(&fields) {
                Ok(record) => record,
                Err(BetwireError::MalformedRecord(reason)) => {
                    self.sink.emit(SessionEvent::RecordRejected { reason });
                    continue;
                }
                Err(other) => return Err(other),
            };

            let record_len = record.encoded_len();
            if batch.encoded_bytes + record_len > self.max_bytes {
                batch.overflow = Some(OverflowInfo {
                    national_id: record.national_id,
                    record_len,
                    batch_bytes: batch.encoded_bytes,
                });
                break;
            }

            batch.encoded_bytes += record_len;
            batch.records.push(record);
        }

        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingSink;
    use crate::source::VecSource;

    // ("a", "b", id, "c", 2) encodes to 23 bytes: 20 fixed + 3 text.
    const SMALL_RECORD_LEN: usize = 23;

    fn small_row(id: u32) -> Vec<String> {
        vec![
            "a".to_string(),
            "b".to_string(),
            id.to_string(),
            "c".to_string(),
            "2".to_string(),
        ]
    }

    fn builder(max_records: usize, max_bytes: usize) -> (BatchBuilder, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        (
            BatchBuilder::new(max_records, max_bytes, sink.clone()),
            sink,
        )
    }

    #[test]
    fn test_record_cap_closes_batch_without_final_flag() {
        let (builder, _sink) = builder(2, 1024);
        let mut source = VecSource::new(vec![small_row(1), small_row(2), small_row(3)]);

        let batch = builder.build_next(&mut source).unwrap();
        assert_eq!(batch.count(), 2);
        assert!(!batch.is_final);
        assert_eq!(batch.encoded_bytes, 2 * SMALL_RECORD_LEN);
        assert!(batch.overflow.is_none());

        let rest = builder.build_next(&mut source).unwrap();
        assert_eq!(rest.count(), 1);
        assert!(rest.is_final);
    }

    #[test]
    fn test_exact_multiple_ends_with_empty_final_batch() {
        let (builder, _sink) = builder(2, 1024);
        let mut source = VecSource::new(vec![small_row(1), small_row(2)]);

        let full = builder.build_next(&mut source).unwrap();
        assert_eq!(full.count(), 2);
        assert!(!full.is_final);

        let last = builder.build_next(&mut source).unwrap();
        assert!(last.is_empty());
        assert!(last.is_final);
        assert_eq!(last.encoded_bytes, 0);
    }

    #[test]
    fn test_empty_source_yields_empty_final_batch() {
        let (builder, _sink) = builder(10, 1024);
        let mut source = VecSource::new(vec![]);

        let batch = builder.build_next(&mut source).unwrap();
        assert!(batch.is_empty());
        assert!(batch.is_final);
    }

    #[test]
    fn test_byte_cap_refuses_record_and_marks_overflow() {
        // Cap admits exactly two small records.
        let (builder, _sink) = builder(10, 2 * SMALL_RECORD_LEN);
        let mut source = VecSource::new(vec![small_row(1), small_row(2), small_row(3)]);

        let batch = builder.build_next(&mut source).unwrap();
        assert_eq!(batch.count(), 2);
        assert_eq!(batch.encoded_bytes, 2 * SMALL_RECORD_LEN);
        assert!(!batch.is_final);

        let overflow = batch.overflow.expect("third record must be refused");
        assert_eq!(overflow.national_id, 3);
        assert_eq!(overflow.record_len, SMALL_RECORD_LEN);
        assert_eq!(overflow.batch_bytes, 2 * SMALL_RECORD_LEN);
    }

    #[test]
    fn test_single_oversized_record_overflows_empty_batch() {
        let (builder, _sink) = builder(10, SMALL_RECORD_LEN - 1);
        let mut source = VecSource::new(vec![small_row(7)]);

        let batch = builder.build_next(&mut source).unwrap();
        assert!(batch.is_empty());

        let overflow = batch.overflow.expect("record larger than the cap");
        assert_eq!(overflow.national_id, 7);
        assert_eq!(overflow.batch_bytes, 0);
    }

    #[test]
    fn test_malformed_rows_skipped_and_reported() {
        let (builder, sink) = builder(10, 1024);
        let mut source = VecSource::new(vec![
            small_row(1),
            vec!["too".to_string(), "short".to_string()],
            vec![
                "a".to_string(),
                "b".to_string(),
                "not-a-number".to_string(),
                "c".to_string(),
                "2".to_string(),
            ],
            small_row(2),
        ]);

        let batch = builder.build_next(&mut source).unwrap();
        assert_eq!(batch.count(), 2);
        assert!(batch.is_final);

        let rejected = sink
            .take()
            .into_iter()
            .filter(|e| matches!(e, SessionEvent::RecordRejected { .. }))
            .count();
        assert_eq!(rejected, 2);
    }

    #[test]
    fn test_skipped_rows_do_not_count_toward_record_cap() {
        let (builder, _sink) = builder(2, 1024);
        let mut source = VecSource::new(vec![
            vec!["bad".to_string()],
            small_row(1),
            small_row(2),
            small_row(3),
        ]);

        let batch = builder.build_next(&mut source).unwrap();
        assert_eq!(batch.count(), 2);
        assert_eq!(batch.records[0].national_id, 1);
        assert_eq!(batch.records[1].national_id, 2);
    }

    #[test]
    fn test_source_error_propagates() {
        struct BrokenSource;
        impl RecordSource for BrokenSource {
            fn next_record(&mut self) -> Result<Option<Vec<String>>> {
                Err(BetwireError::Source(csv::Error::from(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "dataset unreadable",
                ))))
            }
        }

        let (builder, _sink) = builder(10, 1024);
        let result = builder.build_next(&mut BrokenSource);
        assert!(matches!(result.unwrap_err(), BetwireError::Source(_)));
    }
}
