//! Sliding-window rate limiter for outbound podcast directory calls.
//!
//! The limiter keeps the timestamps of admitted requests inside the trailing
//! window. A caller is admitted once fewer than `max_requests` timestamps
//! remain in the window; otherwise it sleeps until the oldest one leaves the
//! window and checks again. Waiters queue on a fair async mutex, so admission
//! order equals call order.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use thiserror::Error;
use tokio::sync::Notify;
use tokio::time::{Duration, Instant};
use tracing::debug;

use crate::config::RateLimitConfig;
use crate::metrics;

/// Errors raised when building a limiter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RateLimitError {
    #[error("Invalid rate limit configuration: {0}")]
    InvalidConfig(String),
}

/// Rate limit status snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateLimitStatus {
    pub max_requests: u32,
    pub window_ms: u64,
    pub requests_in_window: u32,
    pub next_available_in_ms: Option<u64>,
}

/// Sliding-window limiter shared by every caller of one directory client.
pub struct SlidingWindowLimiter {
    max_requests: usize,
    window: Duration,
    /// Admission timestamps, oldest first.
    admissions: Mutex<VecDeque<Instant>>,
    /// Held by the caller currently waiting for a slot.
    queue: tokio::sync::Mutex<()>,
    reset_signal: Notify,
}

impl std::fmt::Debug for SlidingWindowLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlidingWindowLimiter")
            .field("max_requests", &self.max_requests)
            .field("window", &self.window)
            .finish()
    }
}

impl SlidingWindowLimiter {
    /// Create a limiter admitting `max_requests` per trailing `window`.
    ///
    /// A zero request count or an empty window would block callers forever,
    /// so both are rejected here.
    pub fn new(max_requests: u32, window: Duration) -> Result<Self, RateLimitError> {
        if max_requests == 0 {
            return Err(RateLimitError::InvalidConfig(
                "max_requests must be at least 1".to_string(),
            ));
        }
        if window.is_zero() {
            return Err(RateLimitError::InvalidConfig(
                "time window must be positive".to_string(),
            ));
        }

        Ok(Self {
            max_requests: max_requests as usize,
            window,
            admissions: Mutex::new(VecDeque::with_capacity(max_requests as usize)),
            queue: tokio::sync::Mutex::new(()),
            reset_signal: Notify::new(),
        })
    }

    /// Create a limiter from the `[rate_limit]` config section.
    pub fn from_config(config: &RateLimitConfig) -> Result<Self, RateLimitError> {
        Self::new(
            config.max_requests,
            Duration::from_millis(config.time_window_ms),
        )
    }

    /// Wait until one more request fits in the window, then record it.
    pub async fn wait(&self) {
        let _turn = self.queue.lock().await;
        let started = Instant::now();
        let mut waited = false;

        loop {
            // Registered before the check so a concurrent reset is never missed.
            let reset = self.reset_signal.notified();

            let delay = match self.try_admit(Instant::now()) {
                Ok(()) => {
                    if waited {
                        metrics::RATE_LIMIT_WAITS.inc();
                        metrics::RATE_LIMIT_WAIT_DURATION
                            .observe(started.elapsed().as_secs_f64());
                    }
                    return;
                }
                Err(delay) => delay,
            };

            waited = true;
            debug!(delay_ms = delay.as_millis() as u64, "Rate limit reached, waiting");

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = reset => {}
            }
        }
    }

    /// Try to take a slot without waiting.
    ///
    /// Returns `Err(wait)` with the time until a slot frees up. Fails while
    /// another caller is queued in [`wait`](Self::wait), so it never jumps
    /// the queue.
    pub fn try_acquire(&self) -> Result<(), Duration> {
        let Ok(_turn) = self.queue.try_lock() else {
            let now = Instant::now();
            let admissions = self.lock_admissions();
            return Err(self.delay_for(&admissions, now).unwrap_or(Duration::ZERO));
        };
        self.try_admit(Instant::now())
    }

    /// Forget every recorded admission and wake sleeping waiters.
    pub fn reset(&self) {
        self.lock_admissions().clear();
        self.reset_signal.notify_waiters();
        debug!("Rate limiter reset");
    }

    /// Current window status.
    pub fn status(&self) -> RateLimitStatus {
        let now = Instant::now();
        let mut admissions = self.lock_admissions();
        self.prune(&mut admissions, now);

        RateLimitStatus {
            max_requests: self.max_requests as u32,
            window_ms: self.window.as_millis() as u64,
            requests_in_window: admissions.len() as u32,
            next_available_in_ms: self
                .delay_for(&admissions, now)
                .map(|d| d.as_millis() as u64),
        }
    }

    /// Admit at `now` or report how long until the oldest admission expires.
    ///
    /// The whole check-and-record runs under one lock with no await point.
    fn try_admit(&self, now: Instant) -> Result<(), Duration> {
        let mut admissions = self.lock_admissions();
        self.prune(&mut admissions, now);

        match self.delay_for(&admissions, now) {
            None => {
                admissions.push_back(now);
                Ok(())
            }
            Some(delay) => Err(delay),
        }
    }

    fn prune(&self, admissions: &mut VecDeque<Instant>, now: Instant) {
        while let Some(oldest) = admissions.front() {
            if now.saturating_duration_since(*oldest) >= self.window {
                admissions.pop_front();
            } else {
                break;
            }
        }
    }

    /// Time until a slot frees up, `None` if one is free now.
    fn delay_for(&self, admissions: &VecDeque<Instant>, now: Instant) -> Option<Duration> {
        if admissions.len() < self.max_requests {
            return None;
        }
        let oldest = admissions.front()?;
        Some(
            self.window
                .saturating_sub(now.saturating_duration_since(*oldest)),
        )
    }

    fn lock_admissions(&self) -> MutexGuard<'_, VecDeque<Instant>> {
        // A panic mid-update leaves at worst a stale timestamp list.
        self.admissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
