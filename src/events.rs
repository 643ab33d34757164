//! Session events and the sink capability that receives them.
//!
//! Components never log through a process-wide singleton. Each one holds
//! an `Arc<dyn EventSink>` handed in at construction and emits typed
//! [`SessionEvent`] values through it. The default [`TracingSink`] maps
//! events onto `tracing` with structured fields; [`RecordingSink`]
//! captures them for assertions; [`NullSink`] discards them.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use betwire::{RecordingSink, SessionEvent};
//!
//! let sink = Arc::new(RecordingSink::new());
//! sink.emit(SessionEvent::Connected { addr: "127.0.0.1:9090".into() });
//! assert_eq!(sink.take().len(), 1);
//! ```

use std::sync::{Mutex, PoisonError};

/// One observable step of a session.
///
/// Error-carrying variants hold the rendered error text rather than the
/// error value so events stay `Clone` and comparable in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A dial attempt failed; more attempts may follow.
    ConnectAttemptFailed {
        attempt: u32,
        max_attempts: u32,
        error: String,
    },
    /// A connection was established.
    Connected { addr: String },
    /// A source record failed to parse and was skipped.
    RecordRejected { reason: String },
    /// One record's bytes were written to the connection.
    RecordSent { national_id: u32, bet_number: u32 },
    /// A whole batch (header plus records) was written.
    BatchSent {
        count: u32,
        bytes: usize,
        is_final: bool,
    },
    /// The winner list arrived and decoded.
    WinnersReceived { count: u32 },
    /// The session reached `Done`.
    SessionCompleted { batches: u32, records: u64 },
    /// The session reached `Failed`.
    SessionFailed { error: String },
}

/// Receiver for [`SessionEvent`] values.
///
/// Implementations must be cheap and non-blocking; emission happens on
/// the session task between protocol steps.
pub trait EventSink: Send + Sync {
    /// Deliver one event.
    fn emit(&self, event: SessionEvent);
}

/// Sink that forwards every event to `tracing`.
///
/// Recoverable events log at `warn`, terminal failure at `error`,
/// everything else at `info`/`debug`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: SessionEvent) {
        match event {
            SessionEvent::ConnectAttemptFailed {
                attempt,
                max_attempts,
                error,
            } => {
                tracing::warn!(attempt, max_attempts, %error, "Connect attempt failed");
            }
            SessionEvent::Connected { addr } => {
                tracing::debug!(%addr, "Connected");
            }
            SessionEvent::RecordRejected { reason } => {
                tracing::warn!(%reason, "Record rejected");
            }
            SessionEvent::RecordSent {
                national_id,
                bet_number,
            } => {
                tracing::info!(national_id, bet_number, "Record sent");
            }
            SessionEvent::BatchSent {
                count,
                bytes,
                is_final,
            } => {
                tracing::info!(count, bytes, is_final, "Batch sent");
            }
            SessionEvent::WinnersReceived { count } => {
                tracing::info!(count, "Winners received");
            }
            SessionEvent::SessionCompleted { batches, records } => {
                tracing::info!(batches, records, "Session completed");
            }
            SessionEvent::SessionFailed { error } => {
                tracing::error!(%error, "Session failed");
            }
        }
    }
}

/// Sink that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: SessionEvent) {}
}

/// Sink that stores events in order for later inspection.
///
/// Intended for tests; `take()` drains the captured events.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SessionEvent>>,
}

impl RecordingSink {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain and return everything captured so far.
    pub fn take(&self) -> Vec<SessionEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Copy of the captured events, leaving them in place.
    pub fn snapshot(&self) -> Vec<SessionEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: SessionEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}
