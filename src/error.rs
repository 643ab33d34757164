//! Error types for the betwire client.

use thiserror::Error;

/// Main error type for all betwire operations.
#[derive(Debug, Error)]
pub enum BetwireError {
    /// Dial failed after exhausting every handshake attempt.
    #[error("connection to {addr} failed after {attempts} attempts: {source}")]
    Connection {
        addr: String,
        attempts: u32,
        #[source]
        source: std::io::Error,
    },

    /// I/O failure or unexpected stream end in the middle of a message.
    #[error("protocol I/O error: {0}")]
    ProtocolIo(#[from] std::io::Error),

    /// Wire bytes that violate the protocol layout (truncated message,
    /// invalid flag byte).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Source record that does not parse into a bet. Recoverable: the
    /// batch builder skips the record and keeps going.
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    /// Admitting a record would exceed the batch byte cap.
    #[error("batch overflow: record {national_id} needs {record_len} bytes, batch holds {batch_bytes} of {max_bytes}")]
    BatchOverflow {
        national_id: u32,
        record_len: usize,
        batch_bytes: usize,
        max_bytes: usize,
    },

    /// The record source itself failed (file I/O or CSV framing).
    #[error("source error: {0}")]
    Source(#[from] csv::Error),

    /// Unreadable or invalid configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Result type alias using BetwireError.
pub type Result<T> = std::result::Result<T, BetwireError>;
