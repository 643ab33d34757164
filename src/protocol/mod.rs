//! Protocol module - wire format and record codec.
//!
//! This module implements the binary protocol spoken to the aggregator:
//! - 9-byte batch header encoding/decoding
//! - length-prefixed bet record codec with exact size accounting
//! - winner response codec

mod record;
mod wire_format;

pub use record::{BetRecord, RECORD_FIXED_OVERHEAD};
pub use wire_format::{
    decode_u32, decode_winner_ids, decode_winner_list, encode_winner_list, BatchHeader,
    BATCH_HEADER_SIZE, U32_SIZE,
};
