//! TCP dialing and the owned connection resource.
//!
//! [`connect`] performs the bounded-retry handshake and returns a
//! [`ConnectionHandle`] owning the socket. The handle is not `Clone`
//! and [`ConnectionHandle::release`] consumes it, so exactly one live
//! connection can exist per session and a released one cannot be
//! reused. Dropping the handle closes the socket on paths that never
//! reach `release`.
//!
//! Transfers never assume one syscall moves the full payload: both
//! directions loop until the exact byte count is done, and a
//! zero-length transfer fails the message.
//!
//! # Example
//!
//! ```ignore
//! use betwire::events::NullSink;
//! use betwire::transport::{connect, RetryPolicy};
//!
//! let policy = RetryPolicy::fixed(3, std::time::Duration::from_secs(1));
//! let mut conn = connect("127.0.0.1:9090", &policy, &NullSink).await?;
//! conn.send_all(b"payload").await?;
//! conn.release().await;
//! ```

use std::io;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use super::retry::RetryPolicy;
use crate::error::{BetwireError, Result};
use crate::events::{EventSink, SessionEvent};
use crate::protocol::{decode_u32, U32_SIZE};

/// Dial `addr`, retrying per `policy`.
///
/// Emits a `ConnectAttemptFailed` event per failed attempt and sleeps
/// the policy delay between attempts, never after the last one. Once
/// attempts are exhausted the error is terminal; callers do not retry
/// around this function.
pub async fn connect(
    addr: &str,
    policy: &RetryPolicy,
    sink: &dyn EventSink,
) -> Result<ConnectionHandle> {
    let mut last_error = None;

    for attempt in 1..=policy.max_attempts {
        match TcpStream::connect(addr).await {
            Ok(stream) => {
                sink.emit(SessionEvent::Connected {
                    addr: addr.to_string(),
                });
                return Ok(ConnectionHandle { stream });
            }
            Err(error) => {
                sink.emit(SessionEvent::ConnectAttemptFailed {
                    attempt,
                    max_attempts: policy.max_attempts,
                    error: error.to_string(),
                });
                last_error = Some(error);
                if attempt < policy.max_attempts {
                    tokio::time::sleep(policy.delay_for(attempt)).await;
                }
            }
        }
    }

    Err(BetwireError::Connection {
        addr: addr.to_string(),
        attempts: policy.max_attempts,
        source: last_error
            .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "no attempts made")),
    })
}

/// One live TCP connection, exclusively owned.
#[derive(Debug)]
pub struct ConnectionHandle {
    stream: TcpStream,
}

impl ConnectionHandle {
    /// Write all of `buf`, looping across partial writes.
    ///
    /// A zero-length write means the peer stopped accepting bytes and
    /// fails the transfer with the partial count.
    pub async fn send_all(&mut self, buf: &[u8]) -> Result<()> {
        let mut sent = 0;
        while sent < buf.len() {
            let n = self.stream.write(&buf[sent..]).await?;
            if n == 0 {
                return Err(BetwireError::ProtocolIo(io::Error::new(
                    io::ErrorKind::WriteZero,
                    format!("connection accepted {} of {} bytes", sent, buf.len()),
                )));
            }
            sent += n;
        }
        Ok(())
    }

    /// Read exactly `n` bytes, looping across partial reads.
    ///
    /// A read of zero bytes before `n` arrived means the peer closed
    /// the stream mid-message; the error carries the partial count.
    pub async fn recv_exact(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        let mut received = 0;
        while received < n {
            let count = self.stream.read(&mut buf[received..]).await?;
            if count == 0 {
                return Err(BetwireError::ProtocolIo(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("connection closed after {} of {} bytes", received, n),
                )));
            }
            received += count;
        }
        Ok(buf)
    }

    /// Read one Big Endian `u32`.
    pub async fn recv_u32(&mut self) -> Result<u32> {
        let word = self.recv_exact(U32_SIZE).await?;
        decode_u32(&word)
    }

    /// Close the connection, consuming the handle.
    ///
    /// Shutdown errors are ignored; there is nothing left to salvage
    /// from a connection being discarded.
    pub async fn release(mut self) {
        let _ = self.stream.shutdown().await;
    }
}
