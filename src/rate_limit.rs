//! Fixed-window request rate limiting.
//!
//! Every identifier (`"<endpoint>:<client-ip>"`) owns at most one window. The
//! first request opens it, later requests count against it until
//! `max_requests` is reached, and the next request after the window ends opens
//! a fresh one. Windows are fixed, not sliding: a burst straddling a boundary
//! can let through up to `2 * max_requests` in one `window_ms` span.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::metrics::{RATE_LIMIT_ENTRIES, RATE_LIMIT_SWEPT};
use crate::store::{MemoryStore, RateLimitStore};

/// Table size above which `check` sweeps expired entries before evaluating.
pub const DEFAULT_SWEEP_THRESHOLD: usize = 10_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RateLimitError {
    /// Non-positive limits, or a window that overflows the clock.
    #[error("invalid rate limit policy: {0}")]
    InvalidPolicy(String),

    #[error("rate limit identifier must not be empty")]
    InvalidIdentifier,

    /// The store never evaluated the entry.
    #[error("rate limit store unavailable: {0}")]
    StoreUnavailable(String),
}

// Rate limit entry - tracks requests per identifier in the current window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitEntry {
    pub identifier: String,
    pub count: u32,
    /// Milliseconds since the unix epoch at which the window closes.
    pub window_reset_at_ms: i64,
}

impl RateLimitEntry {
    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms >= self.window_reset_at_ms
    }
}

/// Allowed traffic rate for one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_requests: u32,
    pub window_ms: u64,
}

impl RateLimitPolicy {
    pub const fn new(max_requests: u32, window_ms: u64) -> Self {
        Self {
            max_requests,
            window_ms,
        }
    }

    pub fn validate(&self) -> Result<(), RateLimitError> {
        if self.max_requests == 0 {
            return Err(RateLimitError::InvalidPolicy(
                "max_requests must be greater than zero".to_owned(),
            ));
        }
        if self.window_ms == 0 {
            return Err(RateLimitError::InvalidPolicy(
                "window_ms must be greater than zero".to_owned(),
            ));
        }
        self.window_ms_signed().map(|_| ())
    }

    fn window_ms_signed(&self) -> Result<i64, RateLimitError> {
        i64::try_from(self.window_ms).map_err(|_| {
            RateLimitError::InvalidPolicy(format!("window_ms {} is out of range", self.window_ms))
        })
    }
}

/// Result of a single `check`. Denial is data, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at_ms: i64,
}

impl RateLimitDecision {
    /// Whole seconds until the window resets, rounded up.
    pub fn retry_after_secs(&self, now_ms: i64) -> u64 {
        let wait_ms = self.reset_at_ms.saturating_sub(now_ms).max(0) as u64;
        wait_ms.div_ceil(1000)
    }
}

/// Source of "now" in milliseconds since the unix epoch.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    clock: Arc<dyn Clock>,
    sweep_threshold: usize,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            sweep_threshold: DEFAULT_SWEEP_THRESHOLD,
        }
    }

    // In-process limiter on the wall clock
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(SystemClock))
    }

    pub fn with_sweep_threshold(mut self, sweep_threshold: usize) -> Self {
        self.sweep_threshold = sweep_threshold;
        self
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Number of identifiers currently tracked.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Counts one request for `identifier` against `policy`.
    ///
    /// Opens a new window when none is live, increments the live window while
    /// it has quota left, and otherwise denies without touching the entry.
    pub fn check(
        &self,
        identifier: &str,
        policy: &RateLimitPolicy,
    ) -> Result<RateLimitDecision, RateLimitError> {
        if identifier.trim().is_empty() {
            return Err(RateLimitError::InvalidIdentifier);
        }
        policy.validate()?;

        let now = self.clock.now_ms();
        let fresh_reset_at = now.checked_add(policy.window_ms_signed()?).ok_or_else(|| {
            RateLimitError::InvalidPolicy(format!(
                "window of {} ms overflows the clock",
                policy.window_ms
            ))
        })?;

        if self.store.len() > self.sweep_threshold {
            self.sweep_at(now);
        }

        let mut decision = None;
        self.store.update(identifier, &mut |current: Option<&RateLimitEntry>| {
            let (next, outcome) = evaluate(identifier, current, policy, now, fresh_reset_at);
            decision = Some(outcome);
            next
        });

        let decision = decision.ok_or_else(|| {
            RateLimitError::StoreUnavailable(format!("no entry evaluated for {identifier}"))
        })?;

        debug!(
            identifier,
            allowed = decision.allowed,
            remaining = decision.remaining,
            reset_at_ms = decision.reset_at_ms,
            "rate limit checked"
        );

        Ok(decision)
    }

    /// Drops every entry whose window has closed. Returns how many went.
    pub fn sweep(&self) -> usize {
        self.sweep_at(self.clock.now_ms())
    }

    // Inline and background sweeps both land in the same metrics
    fn sweep_at(&self, now: i64) -> usize {
        let removed = self.store.sweep(now);
        let remaining = self.store.len();
        RATE_LIMIT_SWEPT.inc_by(removed as f64);
        RATE_LIMIT_ENTRIES.set(remaining as f64);
        debug!(removed, remaining, "swept expired rate limit entries");
        removed
    }
}

// Returns the entry to write (None = leave untouched) and the caller's answer
fn evaluate(
    identifier: &str,
    current: Option<&RateLimitEntry>,
    policy: &RateLimitPolicy,
    now: i64,
    fresh_reset_at: i64,
) -> (Option<RateLimitEntry>, RateLimitDecision) {
    match current {
        Some(entry) if !entry.is_expired(now) => {
            if entry.count < policy.max_requests {
                let count = entry.count + 1;
                let next = RateLimitEntry {
                    identifier: entry.identifier.clone(),
                    count,
                    window_reset_at_ms: entry.window_reset_at_ms,
                };
                let decision = RateLimitDecision {
                    allowed: true,
                    remaining: policy.max_requests - count,
                    reset_at_ms: entry.window_reset_at_ms,
                };
                (Some(next), decision)
            } else {
                let decision = RateLimitDecision {
                    allowed: false,
                    remaining: 0,
                    reset_at_ms: entry.window_reset_at_ms,
                };
                (None, decision)
            }
        }
        // no window yet, or it closed
        _ => {
            let next = RateLimitEntry {
                identifier: identifier.to_owned(),
                count: 1,
                window_reset_at_ms: fresh_reset_at,
            };
            let decision = RateLimitDecision {
                allowed: true,
                remaining: policy.max_requests - 1,
                reset_at_ms: fresh_reset_at,
            };
            (Some(next), decision)
        }
    }
}
