//! Per-connection rate limiting for WebSocket commands.
//!
//! Each connection owns a [`MessageLimiter`] that combines a short burst
//! window with a longer sustained window.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Sliding window rate limiter
#[derive(Debug)]
pub struct RateLimiter {
    /// Timestamps of accepted requests, oldest first
    timestamps: VecDeque<Instant>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    /// Allow `max_requests` within any `window`.
    ///
    /// ```
    /// use ld_server::api::rate_limiter::RateLimiter;
    /// use std::time::Duration;
    ///
    /// let mut limiter = RateLimiter::new(2, Duration::from_secs(1));
    /// assert!(limiter.check());
    /// assert!(limiter.check());
    /// assert!(!limiter.check());
    /// ```
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            timestamps: VecDeque::with_capacity(max_requests),
            max_requests,
            window,
        }
    }

    /// 10 messages per second
    pub fn burst() -> Self {
        Self::new(10, Duration::from_secs(1))
    }

    /// 100 messages per minute
    pub fn sustained() -> Self {
        Self::new(100, Duration::from_secs(60))
    }

    /// Record a request if the window has room. Returns `false` when the
    /// limit is reached; rejected requests don't count against the window.
    pub fn check(&mut self) -> bool {
        self.check_at(Instant::now())
    }

    fn check_at(&mut self, now: Instant) -> bool {
        while let Some(ts) = self.timestamps.front() {
            if now.duration_since(*ts) > self.window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }

        if self.timestamps.len() >= self.max_requests {
            return false;
        }

        self.timestamps.push_back(now);
        true
    }

    /// Requests still allowed in the current window
    pub fn remaining(&self) -> usize {
        self.max_requests.saturating_sub(self.timestamps.len())
    }
}

/// Which window rejected a message
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Throttled {
    Burst,
    Sustained,
}

impl Throttled {
    /// Label used for metrics
    pub fn window(self) -> &'static str {
        match self {
            Self::Burst => "burst",
            Self::Sustained => "sustained",
        }
    }

    /// Text sent back to the client
    pub fn message(self) -> &'static str {
        match self {
            Self::Burst => "Rate limit exceeded. Please slow down.",
            Self::Sustained => "Too many messages. Please wait before sending more.",
        }
    }
}

/// Burst and sustained limits applied together to one connection
#[derive(Debug)]
pub struct MessageLimiter {
    burst: RateLimiter,
    sustained: RateLimiter,
}

impl Default for MessageLimiter {
    fn default() -> Self {
        Self {
            burst: RateLimiter::burst(),
            sustained: RateLimiter::sustained(),
        }
    }
}

impl MessageLimiter {
    pub fn new(burst: RateLimiter, sustained: RateLimiter) -> Self {
        Self { burst, sustained }
    }

    /// Admit one message, reporting the first window that refuses it.
    pub fn check(&mut self) -> Result<(), Throttled> {
        if !self.burst.check() {
            return Err(Throttled::Burst);
        }
        if !self.sustained.check() {
            return Err(Throttled::Sustained);
        }
        Ok(())
    }
}
