//! Session orchestration: the end-to-end submit-then-query lifecycle.
//!
//! One run streams every batch the source yields, then retrieves the
//! winner list:
//! 1. Connect, with bounded retry
//! 2. Build the next batch from the source
//! 3. Send the batch header, then each record in order
//! 4. Non-final batch: release the connection, pause, back to 1
//! 5. Final batch: keep the connection open for the winner query
//! 6. Read and decode the winner response, release, done
//!
//! Malformed source rows are skipped inside the batch builder; every
//! other failure is terminal. A dropped connection mid-run is not
//! resumed.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use betwire::{CsvSource, Session, SessionConfig, TracingSink};
//!
//! let config = SessionConfig::from_file("config.yaml")?;
//! let source = CsvSource::open(&config.data_file)?;
//! let mut session = Session::new(config, source, Arc::new(TracingSink));
//! let winners = session.run().await?;
//! println!("{} winners", winners.len());
//! ```

use std::sync::Arc;

use crate::batch::{Batch, BatchBuilder};
use crate::config::SessionConfig;
use crate::error::{BetwireError, Result};
use crate::events::{EventSink, SessionEvent};
use crate::protocol::{decode_winner_ids, BatchHeader, BATCH_HEADER_SIZE, U32_SIZE};
use crate::source::RecordSource;
use crate::transport::{connect, ConnectionHandle};

/// Observable phase of a session run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Not started.
    Idle,
    /// Dialing the aggregator.
    Connecting,
    /// Writing a batch header and its records.
    SendingBatch,
    /// Batch fully written.
    BatchSent,
    /// Final signal sent; the connection stays open for the query.
    Finalizing,
    /// Blocked on the winner response.
    AwaitingWinners,
    /// Winner list decoded and returned.
    Done,
    /// Terminal failure.
    Failed,
}

/// Drives one agency's full submission session.
pub struct Session<S> {
    config: SessionConfig,
    source: S,
    sink: Arc<dyn EventSink>,
    state: SessionState,
}

impl<S: RecordSource> Session<S> {
    /// Create a session over `source`, reporting through `sink`.
    pub fn new(config: SessionConfig, source: S, sink: Arc<dyn EventSink>) -> Self {
        Self {
            config,
            source,
            sink,
            state: SessionState::Idle,
        }
    }

    /// Current phase.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run the session to completion and return the winner list.
    ///
    /// Drives one full lifecycle; a failed run is not resumable, the
    /// error has already been reported through the sink when this
    /// returns.
    pub async fn run(&mut self) -> Result<Vec<u32>> {
        match self.drive().await {
            Ok(winners) => {
                self.state = SessionState::Done;
                Ok(winners)
            }
            Err(error) => {
                self.state = SessionState::Failed;
                self.sink.emit(SessionEvent::SessionFailed {
                    error: error.to_string(),
                });
                Err(error)
            }
        }
    }

    async fn drive(&mut self) -> Result<Vec<u32>> {
        let builder = BatchBuilder::new(
            self.config.max_batch_records,
            self.config.max_batch_bytes,
            self.sink.clone(),
        );
        let policy = self.config.retry_policy();
        let mut batches_sent: u32 = 0;
        let mut records_sent: u64 = 0;

        loop {
            // 1. One connection per batch.
            self.state = SessionState::Connecting;
            let mut conn =
                connect(&self.config.server_address, &policy, self.sink.as_ref()).await?;

            // 2. Assemble the next batch. A refused record is fatal:
            //    nothing of the batch goes out, the run aborts.
            let batch = builder.build_next(&mut self.source)?;
            if let Some(overflow) = batch.overflow {
                return Err(BetwireError::BatchOverflow {
                    national_id: overflow.national_id,
                    record_len: overflow.record_len,
                    batch_bytes: overflow.batch_bytes,
                    max_bytes: self.config.max_batch_bytes,
                });
            }

            // 3. Header first, then records in source order.
            self.state = SessionState::SendingBatch;
            self.send_batch(&mut conn, &batch).await?;
            self.state = SessionState::BatchSent;
            batches_sent += 1;
            records_sent += batch.records.len() as u64;

            if !batch.is_final {
                // 4. More data remains: scoped release, pause, next round.
                conn.release().await;
                tokio::time::sleep(self.config.batch_delay()).await;
                continue;
            }

            // 5. Final signal sent; the winner query reuses this
            //    connection.
            self.state = SessionState::Finalizing;

            // 6. Wait for the aggregator's response.
            self.state = SessionState::AwaitingWinners;
            let winners = self.await_winners(&mut conn).await?;
            self.sink.emit(SessionEvent::WinnersReceived {
                count: winners.len() as u32,
            });
            self.sink.emit(SessionEvent::SessionCompleted {
                batches: batches_sent,
                records: records_sent,
            });
            conn.release().await;
            return Ok(winners);
        }
    }

    /// Transmit one batch: header, then each record's encoding.
    async fn send_batch(&self, conn: &mut ConnectionHandle, batch: &Batch) -> Result<()> {
        let header = BatchHeader::new(self.config.agency_id, batch.count(), batch.is_final);
        conn.send_all(&header.encode()).await?;

        for record in &batch.records {
            conn.send_all(&record.encode()).await?;
            self.sink.emit(SessionEvent::RecordSent {
                national_id: record.national_id,
                bet_number: record.bet_number,
            });
        }

        self.sink.emit(SessionEvent::BatchSent {
            count: batch.count(),
            bytes: BATCH_HEADER_SIZE + batch.encoded_bytes,
            is_final: batch.is_final,
        });
        Ok(())
    }

    /// Read the winner response off the still-open connection.
    async fn await_winners(&self, conn: &mut ConnectionHandle) -> Result<Vec<u32>> {
        let count = conn.recv_u32().await?;
        let body = conn.recv_exact(count as usize * U32_SIZE).await?;
        decode_winner_ids(&body, count)
    }
}
