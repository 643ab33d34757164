//! Bet record value and its wire codec.
//!
//! A record travels as three length-prefixed text fields followed by two
//! fixed integers:
//! ```text
//! len(first_name) : u32 BE
//! len(last_name)  : u32 BE
//! len(birth_date) : u32 BE
//! first_name      : bytes
//! last_name       : bytes
//! birth_date      : bytes
//! national_id     : u32 BE
//! bet_number      : u32 BE
//! ```
//!
//! Length prefixes count raw bytes, not characters. `encode` and
//! `encoded_len` agree exactly; the batch builder relies on that to
//! enforce the byte cap before any bytes exist.

use bytes::{BufMut, BytesMut};

use super::wire_format::U32_SIZE;
use crate::error::{BetwireError, Result};

/// Fixed bytes of every encoded record: three length prefixes plus the
/// two trailing integer fields.
pub const RECORD_FIXED_OVERHEAD: usize = 5 * U32_SIZE;

/// One bet: the person placing it and the number wagered.
///
/// Built from a raw 5-field source record via [`BetRecord::parse`] and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BetRecord {
    /// Bettor's first name.
    pub first_name: String,
    /// Bettor's last name.
    pub last_name: String,
    /// Bettor's national identity number.
    pub national_id: u32,
    /// Birth date as fixed-format text (`YYYY-MM-DD`).
    pub birth_date: String,
    /// The wagered number.
    pub bet_number: u32,
}

impl BetRecord {
    /// Create a record from already-validated fields.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        national_id: u32,
        birth_date: impl Into<String>,
        bet_number: u32,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            national_id,
            birth_date: birth_date.into(),
            bet_number,
        }
    }

    /// Parse one raw source record.
    ///
    /// Expects exactly 5 fields in order: first name, last name,
    /// national id, birth date, bet number. Anything else fails with
    /// [`BetwireError::MalformedRecord`].
    pub fn parse(fields: &[String]) -> Result<Self> {
        if fields.len() != 5 {
            return Err(BetwireError::MalformedRecord(format!(
                "expected 5 fields, got {}",
                fields.len()
            )));
        }
        let national_id = fields[2].parse::<u32>().map_err(|_| {
            BetwireError::MalformedRecord(format!("national id {:?} is not a number", fields[2]))
        })?;
        let bet_number = fields[4].parse::<u32>().map_err(|_| {
            BetwireError::MalformedRecord(format!("bet number {:?} is not a number", fields[4]))
        })?;
        Ok(Self {
            first_name: fields[0].clone(),
            last_name: fields[1].clone(),
            national_id,
            birth_date: fields[3].clone(),
            bet_number,
        })
    }

    /// Exact on-wire size of this record in bytes.
    ///
    /// # Example
    ///
    /// ```
    /// use betwire::protocol::BetRecord;
    ///
    /// let record = BetRecord::new("Santiago Lionel", "Lorca", 30904465, "1999-03-17", 7574);
    /// assert_eq!(record.encode().len(), record.encoded_len());
    /// ```
    pub fn encoded_len(&self) -> usize {
        RECORD_FIXED_OVERHEAD
            + self.first_name.len()
            + self.last_name.len()
            + self.birth_date.len()
    }

    /// Encode the record to its wire form.
    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode_into(&mut buf);
        buf
    }

    /// Encode the record, appending to an existing buffer.
    pub fn encode_into(&self, buf: &mut BytesMut) {
        buf.reserve(self.encoded_len());
        buf.put_u32(self.first_name.len() as u32);
        buf.put_u32(self.last_name.len() as u32);
        buf.put_u32(self.birth_date.len() as u32);
        buf.put_slice(self.first_name.as_bytes());
        buf.put_slice(self.last_name.as_bytes());
        buf.put_slice(self.birth_date.as_bytes());
        buf.put_u32(self.national_id);
        buf.put_u32(self.bet_number);
    }

    /// Decode one record from the start of `buf`.
    ///
    /// Returns the record and the number of bytes consumed so callers
    /// can walk a buffer of back-to-back records. Rejects truncated
    /// input and non-UTF-8 text.
    pub fn decode(buf: &[u8]) -> Result<(Self, usize)> {
        if buf.len() < 3 * U32_SIZE {
            return Err(BetwireError::Protocol(format!(
                "record length prefixes need {} bytes, got {}",
                3 * U32_SIZE,
                buf.len()
            )));
        }
        let first_len = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
        let last_len = u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]) as usize;
        let birth_len = u32::from_be_bytes([buf[8], buf[9], buf[10], buf[11]]) as usize;

        let total = RECORD_FIXED_OVERHEAD + first_len + last_len + birth_len;
        if buf.len() < total {
            return Err(BetwireError::Protocol(format!(
                "record needs {} bytes, got {}",
                total,
                buf.len()
            )));
        }

        let mut at = 3 * U32_SIZE;
        let first_name = decode_text(&buf[at..at + first_len])?;
        at += first_len;
        let last_name = decode_text(&buf[at..at + last_len])?;
        at += last_len;
        let birth_date = decode_text(&buf[at..at + birth_len])?;
        at += birth_len;

        let national_id = u32::from_be_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]]);
        at += U32_SIZE;
        let bet_number = u32::from_be_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]]);

        Ok((
            Self {
                first_name,
                last_name,
                national_id,
                birth_date,
                bet_number,
            },
            total,
        ))
    }
}

fn decode_text(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|_| BetwireError::Protocol("text field is not valid UTF-8".to_string()))
}
