//! Transport module - TCP dialing, retry policy, and the owned
//! connection handle.

mod conn;
mod retry;

pub use conn::{connect, ConnectionHandle};
pub use retry::{Backoff, RetryPolicy};
