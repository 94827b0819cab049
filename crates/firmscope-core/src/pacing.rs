//! Rate-considerate pacing for collectors.
//!
//! Every collector talks to a public site that defends itself against
//! abusive traffic. The pacing gate enforces a per-source request quota
//! (governor direct rate limiter) and a randomized courtesy delay between
//! consecutive queries. This is a liveness concern: skipping a delay does
//! not corrupt data, it gets the collector blocked upstream.

use std::num::NonZeroU32;
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

use crate::SourceId;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Per-source pacing parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct PacingPolicy {
    /// Quota window and request budget within it.
    pub quota_window: Duration,
    pub quota_limit: u32,
    /// Randomized pause between consecutive queries, in milliseconds.
    pub courtesy_delay_ms: RangeInclusive<u64>,
}

impl PacingPolicy {
    /// Defaults tuned per upstream: profile sites get the slowest cadence,
    /// the plain-HTTP fallback the fastest.
    pub fn default_for(source: SourceId) -> Self {
        match source {
            SourceId::Crunchbase | SourceId::Linkedin => Self {
                quota_window: Duration::from_secs(60),
                quota_limit: 10,
                courtesy_delay_ms: 1_000..=3_000,
            },
            SourceId::Websearch => Self {
                quota_window: Duration::from_secs(60),
                quota_limit: 20,
                courtesy_delay_ms: 1_000..=3_000,
            },
            SourceId::Directweb => Self {
                quota_window: Duration::from_secs(60),
                quota_limit: 30,
                courtesy_delay_ms: 500..=1_500,
            },
        }
    }

    /// Zero delays for tests and mock transports.
    pub fn unthrottled() -> Self {
        Self {
            quota_window: Duration::from_secs(1),
            quota_limit: 10_000,
            courtesy_delay_ms: 0..=0,
        }
    }
}

/// Gate serializing one collector's outbound requests.
#[derive(Clone)]
pub struct PacingGate {
    limiter: Arc<DirectRateLimiter>,
    policy: PacingPolicy,
}

impl PacingGate {
    pub fn new(policy: PacingPolicy) -> Self {
        let quota = quota_from_window(policy.quota_window, policy.quota_limit);
        Self {
            limiter: Arc::new(RateLimiter::direct(quota)),
            policy,
        }
    }

    pub fn for_source(source: SourceId) -> Self {
        Self::new(PacingPolicy::default_for(source))
    }

    /// Probe the quota without waiting. Returns the recommended wait on
    /// exhaustion (one quota cell's worth of time).
    pub fn try_acquire(&self) -> Result<(), Duration> {
        if self.limiter.check().is_ok() {
            return Ok(());
        }

        Err(cell_duration(
            self.policy.quota_window,
            self.policy.quota_limit,
        ))
    }

    /// Wait until the quota admits one request.
    pub async fn acquire(&self) {
        loop {
            match self.try_acquire() {
                Ok(()) => return,
                Err(wait) => tokio::time::sleep(wait).await,
            }
        }
    }

    /// Randomized pause between consecutive queries against the same source.
    pub async fn courtesy_delay(&self) {
        let range = self.policy.courtesy_delay_ms.clone();
        let (start, end) = (*range.start(), *range.end());
        if end == 0 {
            return;
        }

        let pause = if start == end {
            start
        } else {
            fastrand::u64(start..=end)
        };
        tokio::time::sleep(Duration::from_millis(pause)).await;
    }
}

fn quota_from_window(quota_window: Duration, quota_limit: u32) -> Quota {
    let safe_limit = quota_limit.max(1);
    let burst = NonZeroU32::new(safe_limit).expect("safe limit must be non-zero");
    let period = cell_duration(quota_window, safe_limit);

    Quota::with_period(period)
        .expect("period is always greater than zero")
        .allow_burst(burst)
}

fn cell_duration(quota_window: Duration, quota_limit: u32) -> Duration {
    let seconds = (quota_window.as_secs_f64() / f64::from(quota_limit.max(1))).max(0.001);
    Duration::from_secs_f64(seconds)
}
