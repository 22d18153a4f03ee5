//! Per-client token-bucket rate limiting.
//!
//! # Design Decisions
//! - Refill is computed lazily from elapsed time; no per-key timers
//! - Buckets are created full on first sight of a key
//! - A periodic sweep is the sole reclamation mechanism; an evicted key
//!   that returns is indistinguishable from a fresh client
//! - There is deliberately no cap on key cardinality between sweeps

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::broadcast;
use tokio::time;

/// A single client's token bucket.
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
    last_seen: Instant,
}

impl TokenBucket {
    fn new(capacity: f64) -> Self {
        let now = Instant::now();
        Self {
            tokens: capacity,
            last_refill: now,
            last_seen: now,
        }
    }

    /// Credit tokens for the time elapsed since the last refill.
    fn refill(&mut self, capacity: f64, rate: f64) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * rate).min(capacity);
        self.last_refill = now;
    }

    fn try_acquire(&mut self, capacity: f64, rate: f64) -> bool {
        self.refill(capacity, rate);
        self.last_seen = Instant::now();

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Time until one full token is available, assuming no other consumers.
    fn wait_for_token(&self, rate: f64) -> Duration {
        if self.tokens >= 1.0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64((1.0 - self.tokens) / rate)
    }
}

/// Diagnostic snapshot of the limiter.
#[derive(Debug, Clone, Serialize)]
pub struct RateLimiterStats {
    /// Number of keys currently holding a bucket.
    pub active_keys: usize,
    /// Configured sustained rate.
    pub requests_per_second: f64,
    /// Configured bucket capacity.
    pub burst_size: u32,
}

/// Keyed token-bucket store shared by all request tasks and the sweep.
pub struct RateLimiter {
    buckets: Mutex<HashMap<String, TokenBucket>>,
    requests_per_second: f64,
    burst_size: u32,
}

impl RateLimiter {
    pub fn new(requests_per_second: f64, burst_size: u32) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            requests_per_second,
            burst_size,
        }
    }

    /// Try to consume one token for `key`. Creates a full bucket on first
    /// use. Returns false without side effect when no token is available.
    pub fn allow(&self, key: &str) -> bool {
        let mut buckets = self.buckets.lock().expect("rate limiter mutex poisoned");
        let bucket = buckets
            .entry(key.to_string())
            .or_insert_with(|| TokenBucket::new(self.burst_size as f64));
        bucket.try_acquire(self.burst_size as f64, self.requests_per_second)
    }

    /// How long the caller would need to wait for a token. Consumes
    /// nothing; whether to wait or reject is the caller's decision.
    pub fn reserve(&self, key: &str) -> Duration {
        let mut buckets = self.buckets.lock().expect("rate limiter mutex poisoned");
        let bucket = buckets
            .entry(key.to_string())
            .or_insert_with(|| TokenBucket::new(self.burst_size as f64));
        bucket.refill(self.burst_size as f64, self.requests_per_second);
        bucket.last_seen = Instant::now();
        bucket.wait_for_token(self.requests_per_second)
    }

    /// Approximate token balance for diagnostic headers. Racy against
    /// concurrent `allow` calls by design.
    pub fn tokens(&self, key: &str) -> f64 {
        let buckets = self.buckets.lock().expect("rate limiter mutex poisoned");
        match buckets.get(key) {
            Some(bucket) => {
                let elapsed = bucket.last_refill.elapsed().as_secs_f64();
                (bucket.tokens + elapsed * self.requests_per_second).min(self.burst_size as f64)
            }
            None => self.burst_size as f64,
        }
    }

    /// Diagnostic snapshot.
    pub fn stats(&self) -> RateLimiterStats {
        let buckets = self.buckets.lock().expect("rate limiter mutex poisoned");
        RateLimiterStats {
            active_keys: buckets.len(),
            requests_per_second: self.requests_per_second,
            burst_size: self.burst_size,
        }
    }

    /// Remove buckets idle longer than `idle_threshold`. Returns how many
    /// were evicted.
    pub fn sweep_idle(&self, idle_threshold: Duration) -> usize {
        let mut buckets = self.buckets.lock().expect("rate limiter mutex poisoned");
        let before = buckets.len();
        buckets.retain(|_, bucket| bucket.last_seen.elapsed() < idle_threshold);
        before - buckets.len()
    }

    /// Background sweep loop. Checks the shutdown signal at its own pace;
    /// eviction is never urgent.
    pub async fn run_sweep(
        &self,
        interval: Duration,
        idle_threshold: Duration,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        tracing::info!(
            interval_secs = interval.as_secs(),
            idle_secs = idle_threshold.as_secs(),
            "Rate limiter sweep starting"
        );

        let mut ticker = time::interval(interval);
        ticker.tick().await; // the first tick completes immediately

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let evicted = self.sweep_idle(idle_threshold);
                    if evicted > 0 {
                        tracing::debug!(evicted, "Evicted idle rate limit buckets");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Rate limiter sweep received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}
