//! Wire format encoding and decoding for batch headers and winner lists.
//!
//! Implements the 9-byte batch header format:
//! ```text
//! ┌───────────┬───────────┬──────────┐
//! │ Agency ID │ Count     │ Is Final │
//! │ 4 bytes   │ 4 bytes   │ 1 byte   │
//! │ uint32 BE │ uint32 BE │ 0 or 1   │
//! └───────────┴───────────┴──────────┘
//! ```
//!
//! and the winner response format: `count:u32` followed by `count`
//! national ids, each `u32`.
//!
//! All multi-byte integers are Big Endian.

use crate::error::{BetwireError, Result};

/// Size of every integer field on the wire, in bytes.
pub const U32_SIZE: usize = 4;

/// Batch header size in bytes (fixed, exactly 9).
pub const BATCH_HEADER_SIZE: usize = 9;

/// Header announcing one batch of bet records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchHeader {
    /// Submitting agency.
    pub agency_id: u32,
    /// Number of records that follow the header.
    pub count: u32,
    /// True when no further batch will be sent on this session.
    pub is_final: bool,
}

impl BatchHeader {
    /// Create a new batch header.
    pub fn new(agency_id: u32, count: u32, is_final: bool) -> Self {
        Self {
            agency_id,
            count,
            is_final,
        }
    }

    /// Encode header to bytes (Big Endian).
    ///
    /// # Example
    ///
    /// ```
    /// use betwire::protocol::BatchHeader;
    ///
    /// let header = BatchHeader::new(7, 2, false);
    /// let bytes = header.encode();
    /// assert_eq!(bytes.len(), 9);
    /// ```
    pub fn encode(&self) -> [u8; BATCH_HEADER_SIZE] {
        let mut buf = [0u8; BATCH_HEADER_SIZE];
        self.encode_into(&mut buf);
        buf
    }

    /// Encode header into an existing buffer.
    ///
    /// # Panics
    ///
    /// Panics if buffer is smaller than `BATCH_HEADER_SIZE` (9 bytes).
    pub fn encode_into(&self, buf: &mut [u8]) {
        debug_assert!(buf.len() >= BATCH_HEADER_SIZE);
        buf[0..4].copy_from_slice(&self.agency_id.to_be_bytes());
        buf[4..8].copy_from_slice(&self.count.to_be_bytes());
        buf[8] = self.is_final as u8;
    }

    /// Decode header from bytes (Big Endian).
    ///
    /// Rejects a buffer shorter than 9 bytes and any final-flag byte
    /// other than 0 or 1.
    ///
    /// # Example
    ///
    /// ```
    /// use betwire::protocol::BatchHeader;
    ///
    /// let bytes = [0, 0, 0, 7, 0, 0, 0, 2, 1];
    /// let header = BatchHeader::decode(&bytes).unwrap();
    /// assert_eq!(header.agency_id, 7);
    /// assert_eq!(header.count, 2);
    /// assert!(header.is_final);
    /// ```
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < BATCH_HEADER_SIZE {
            return Err(BetwireError::Protocol(format!(
                "batch header needs {} bytes, got {}",
                BATCH_HEADER_SIZE,
                buf.len()
            )));
        }
        let is_final = match buf[8] {
            0 => false,
            1 => true,
            other => {
                return Err(BetwireError::Protocol(format!(
                    "invalid final-flag byte: {}",
                    other
                )))
            }
        };
        Ok(Self {
            agency_id: u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]),
            count: u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]),
            is_final,
        })
    }
}

/// Decode one Big Endian `u32` from the start of `buf`.
#[inline]
pub fn decode_u32(buf: &[u8]) -> Result<u32> {
    if buf.len() < U32_SIZE {
        return Err(BetwireError::Protocol(format!(
            "u32 field needs {} bytes, got {}",
            U32_SIZE,
            buf.len()
        )));
    }
    Ok(u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]))
}

/// Encode a complete winner response: count, then each national id.
pub fn encode_winner_list(winners: &[u32]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(U32_SIZE + winners.len() * U32_SIZE);
    buf.extend_from_slice(&(winners.len() as u32).to_be_bytes());
    for id in winners {
        buf.extend_from_slice(&id.to_be_bytes());
    }
    buf
}

/// Decode the body of a winner response once its `count` is known.
///
/// `body` must hold exactly `count` Big Endian `u32` values.
pub fn decode_winner_ids(body: &[u8], count: u32) -> Result<Vec<u32>> {
    let expected = count as usize * U32_SIZE;
    if body.len() != expected {
        return Err(BetwireError::Protocol(format!(
            "winner body for {} entries needs {} bytes, got {}",
            count,
            expected,
            body.len()
        )));
    }
    let mut winners = Vec::with_capacity(count as usize);
    for chunk in body.chunks_exact(U32_SIZE) {
        winners.push(u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }
    Ok(winners)
}

/// Decode a complete winner response held in one buffer.
///
/// Inverse of [`encode_winner_list`]; fails if the buffer is truncated
/// or longer than the count announces.
pub fn decode_winner_list(buf: &[u8]) -> Result<Vec<u32>> {
    let count = decode_u32(buf)?;
    decode_winner_ids(&buf[U32_SIZE..], count)
}
