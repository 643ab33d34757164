//! # betwire
//!
//! Agency-side client for the lottery draw: streams bet records to the
//! central aggregator in bounded batches over a fixed big-endian wire
//! protocol, then retrieves the winner list for its agency.
//!
//! ## Architecture
//!
//! - **Protocol** (`protocol`): big-endian encodings for batch headers,
//!   bet records and winner lists
//! - **Batching** (`batch`): count- and size-bounded batch assembly
//! - **Transport** (`transport`): one TCP connection per batch, bounded
//!   connect retry, short-write and short-read safe
//! - **Session**: the submit-then-query lifecycle, one run per agency
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use betwire::{BetwireError, CsvSource, Session, SessionConfig, TracingSink};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), BetwireError> {
//!     let config = SessionConfig::from_file("config.yaml")?;
//!     let source = CsvSource::open(&config.data_file)?;
//!     let mut session = Session::new(config, source, Arc::new(TracingSink));
//!     let winners = session.run().await?;
//!     println!("{} winners", winners.len());
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod events;
pub mod protocol;
pub mod source;
pub mod transport;

mod session;

pub use batch::{Batch, BatchBuilder, OverflowInfo};
pub use config::SessionConfig;
pub use error::{BetwireError, Result};
pub use events::{EventSink, NullSink, RecordingSink, SessionEvent, TracingSink};
pub use protocol::{BatchHeader, BetRecord};
pub use session::{Session, SessionState};
pub use source::{CsvSource, RecordSource, VecSource};
