//! Client-side sliding-window throttle for the search endpoint.
//!
//! The limiter keeps the instants of recent requests. Before each request it
//! drops entries older than the window; if the remaining count has reached
//! the cap the request is refused locally with the number of seconds until
//! the oldest entry expires. It does not coordinate with any server-side
//! limit and starts empty whenever a new limiter is built.

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use crate::error::ApiError;

/// Width of the search rate-limit window.
pub const SEARCH_WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct SlidingWindowLimiter {
    max_requests: usize,
    window: Duration,
    log: VecDeque<Instant>,
}

/// Snapshot of how much of the window is in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitUsage {
    pub used: usize,
    pub limit: usize,
}

impl RateLimitUsage {
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.used)
    }
}

impl fmt::Display for RateLimitUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rate Limit: {}/{} requests in last minute ({} remaining)",
            self.used,
            self.limit,
            self.remaining()
        )
    }
}

impl SlidingWindowLimiter {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            log: VecDeque::new(),
        }
    }

    /// A limiter over the standard one-minute search window.
    #[must_use]
    pub fn per_minute(max_requests: usize) -> Self {
        Self::new(max_requests, SEARCH_WINDOW)
    }

    /// Record a request now if the window has room.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RateLimited`] when the window is full; nothing is
    /// recorded in that case.
    pub fn try_acquire(&mut self) -> Result<(), ApiError> {
        self.try_acquire_at(Instant::now())
    }

    /// [`Self::try_acquire`] against an explicit clock reading.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RateLimited`] when the window is full.
    pub fn try_acquire_at(&mut self, now: Instant) -> Result<(), ApiError> {
        self.purge(now);

        if self.log.len() >= self.max_requests {
            return Err(ApiError::RateLimited {
                wait_secs: self.wait_secs(now),
            });
        }

        self.log.push_back(now);
        Ok(())
    }

    #[must_use]
    pub fn usage_at(&mut self, now: Instant) -> RateLimitUsage {
        self.purge(now);
        RateLimitUsage {
            used: self.log.len(),
            limit: self.max_requests,
        }
    }

    #[must_use]
    pub fn usage(&mut self) -> RateLimitUsage {
        self.usage_at(Instant::now())
    }

    fn purge(&mut self, now: Instant) {
        let window = self.window;
        self.log
            .retain(|&at| now.saturating_duration_since(at) < window);
    }

    /// Whole seconds, rounded up, until the oldest logged request leaves the window.
    fn wait_secs(&self, now: Instant) -> u64 {
        let Some(oldest) = self.log.iter().min() else {
            return 0;
        };
        let remaining = (*oldest + self.window).saturating_duration_since(now);
        let millis = u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX);
        millis.div_ceil(1000)
    }
}
