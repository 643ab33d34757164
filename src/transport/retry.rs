//! Retry schedule for the connect handshake.
//!
//! The policy is a plain value handed to [`connect`]: call sites stay
//! unchanged when the backoff flavor does.
//!
//! [`connect`]: crate::transport::connect

use std::time::Duration;

/// Delay progression between failed dial attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay after every failed attempt.
    Fixed(Duration),
    /// Delay doubles per attempt, clamped to `max`.
    Exponential { base: Duration, max: Duration },
}

/// Bounded retry schedule: how often to dial and how long to wait
/// in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total dial attempts, the first one included.
    pub max_attempts: u32,
    /// Delay progression between attempts.
    pub backoff: Backoff,
}

impl RetryPolicy {
    /// Policy with the same delay between all attempts.
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Fixed(delay),
        }
    }

    /// Policy whose delay doubles from `base`, clamped to `max`.
    pub fn exponential(max_attempts: u32, base: Duration, max: Duration) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Exponential { base, max },
        }
    }

    /// Sleep to insert after failed attempt number `attempt` (1-based).
    ///
    /// The connector never sleeps after the final attempt; it checks
    /// `attempt < max_attempts` before applying this delay.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed(delay) => delay,
            Backoff::Exponential { base, max } => {
                let exp = attempt.saturating_sub(1).min(31);
                base.saturating_mul(2u32.saturating_pow(exp)).min(max)
            }
        }
    }
}
