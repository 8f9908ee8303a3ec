//! Fixed-window submit rate limiter.
//!
//! The window starts at the first attempt recorded after the previous window
//! expired and is not moved by later attempts. Bursts that straddle a window
//! boundary can therefore get up to twice `max_attempts` through in quick
//! succession; this is the accepted approximation of a fixed window.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};

use crate::config::GuardConfig;

/// Source of monotonic time for the limiter.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock for tests and simulations.
///
/// Clones share the same time, so a test can keep one handle and give another
/// to the limiter.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }
}

impl ManualClock {
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Outcome of [`RateLimiter::check`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateDecision {
    pub allowed: bool,
    pub message: Option<String>,
}

impl RateDecision {
    fn allow() -> Self {
        Self {
            allowed: true,
            message: None,
        }
    }

    fn deny(retry_in: Duration) -> Self {
        // round up so we never tell the user "0 seconds"
        let secs = retry_in.as_secs() + u64::from(retry_in.subsec_nanos() > 0);
        Self {
            allowed: false,
            message: Some(format!(
                "Too many attempts. Please wait {} second{} before trying again.",
                secs.max(1),
                if secs.max(1) == 1 { "" } else { "s" }
            )),
        }
    }
}

/// Counts submit attempts inside a fixed window.
pub struct RateLimiter {
    clock: Box<dyn Clock>,
    max_attempts: u32,
    window: Duration,
    attempt_count: u32,
    window_start: Option<Instant>,
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("max_attempts", &self.max_attempts)
            .field("window", &self.window)
            .field("attempt_count", &self.attempt_count)
            .field("window_start", &self.window_start)
            .finish_non_exhaustive()
    }
}

impl RateLimiter {
    pub fn new(config: &GuardConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }

    pub fn with_clock(config: &GuardConfig, clock: impl Clock + 'static) -> Self {
        Self {
            clock: Box::new(clock),
            max_attempts: config.max_attempts,
            window: config.window(),
            attempt_count: 0,
            window_start: None,
        }
    }

    /// Attempts counted in the current window.
    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    fn expire_window(&mut self, now: Instant) {
        if let Some(start) = self.window_start {
            if now.saturating_duration_since(start) > self.window {
                debug!(attempts = self.attempt_count, "rate limit window expired");
                self.attempt_count = 0;
                self.window_start = None;
            }
        }
    }

    /// Whether another attempt may proceed right now.
    pub fn check(&mut self) -> RateDecision {
        let now = self.clock.now();
        self.expire_window(now);

        if self.attempt_count >= self.max_attempts {
            let elapsed = self
                .window_start
                .map(|start| now.saturating_duration_since(start))
                .unwrap_or_default();
            info!(attempts = self.attempt_count, "submit blocked by rate limiter");
            return RateDecision::deny(self.window.saturating_sub(elapsed));
        }
        RateDecision::allow()
    }

    /// Count one attempt; opens a new window if none is running.
    pub fn record_attempt(&mut self) {
        let now = self.clock.now();
        self.expire_window(now);
        if self.window_start.is_none() {
            self.window_start = Some(now);
        }
        self.attempt_count = self.attempt_count.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter() -> (RateLimiter, ManualClock) {
        let clock = ManualClock::default();
        (
            RateLimiter::with_clock(&GuardConfig::default(), clock.clone()),
            clock,
        )
    }

    #[test]
    fn three_pass_fourth_blocked() {
        let (mut limiter, clock) = limiter();
        for _ in 0..3 {
            assert!(limiter.check().allowed);
            limiter.record_attempt();
            clock.advance(Duration::from_secs(5));
        }
        let decision = limiter.check();
        assert!(!decision.allowed);
        assert!(decision.message.unwrap().contains("Too many attempts"));
    }

    #[test]
    fn window_resets_after_expiry() {
        let (mut limiter, clock) = limiter();
        for _ in 0..3 {
            limiter.record_attempt();
        }
        assert!(!limiter.check().allowed);

        clock.advance(Duration::from_secs(61));
        assert!(limiter.check().allowed);
        assert_eq!(limiter.attempt_count(), 0);
    }

    #[test]
    fn exactly_window_is_still_blocked() {
        let (mut limiter, clock) = limiter();
        for _ in 0..3 {
            limiter.record_attempt();
        }
        clock.advance(Duration::from_secs(60));
        assert!(!limiter.check().allowed);
    }

    #[test]
    fn window_start_pinned_to_first_attempt() {
        let (mut limiter, clock) = limiter();
        limiter.record_attempt();
        clock.advance(Duration::from_secs(50));
        limiter.record_attempt();
        limiter.record_attempt();
        assert!(!limiter.check().allowed);

        // 61s after the first attempt, not after the last one
        clock.advance(Duration::from_secs(11));
        assert!(limiter.check().allowed);
    }

    #[test]
    fn cooldown_message_counts_down() {
        let (mut limiter, clock) = limiter();
        for _ in 0..3 {
            limiter.record_attempt();
        }
        clock.advance(Duration::from_secs(59));
        let msg = limiter.check().message.unwrap();
        assert!(msg.contains("1 second "), "{msg}");
    }
}
