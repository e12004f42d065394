// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction for testable time handling.
//!
//! Every timer in the driver — the checkpoint barrier interval, the restore
//! deadline, the deployment stage delays — goes through this seam rather
//! than calling `tokio::time::sleep` directly, so the timing-sensitive
//! scenarios in the checkpoint coordinator are exercisable as fast
//! deterministic unit tests under a [`FakeClock`] instead of real-time
//! integration tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::oneshot;

/// A clock that provides the current time and a timer-scheduling facility.
#[async_trait]
pub trait Clock: Clone + Send + Sync + 'static {
    fn now(&self) -> Instant;
    fn epoch_ms(&self) -> u64;
    /// Suspend the caller for `duration` of this clock's time.
    async fn sleep(&self, duration: Duration);
}

/// Real system clock, backed by `tokio::time::sleep`.
#[derive(Clone, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn epoch_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Fake clock for testing with controllable time. `sleep` never resolves on
/// its own — a test must call [`FakeClock::advance`] (or [`FakeClock::set`])
/// past the requested deadline, at which point any waiters registered for
/// an earlier-or-equal deadline are woken.
#[derive(Clone)]
pub struct FakeClock {
    current: Arc<Mutex<Instant>>,
    epoch_ms: Arc<Mutex<u64>>,
    #[allow(clippy::type_complexity)]
    waiters: Arc<Mutex<Vec<(Instant, oneshot::Sender<()>)>>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            current: Arc::new(Mutex::new(Instant::now())),
            epoch_ms: Arc::new(Mutex::new(1_000_000)),
            waiters: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Advance the clock by the given duration, waking any sleeper whose
    /// deadline has now passed.
    pub fn advance(&self, duration: Duration) {
        let now = {
            let mut c = self.current.lock();
            *c += duration;
            *c
        };
        *self.epoch_ms.lock() += duration.as_millis() as u64;
        self.wake_due(now);
    }

    /// Set the clock to a specific instant, waking any sleeper whose
    /// deadline has now passed.
    pub fn set(&self, instant: Instant) {
        *self.current.lock() = instant;
        self.wake_due(instant);
    }

    /// Set the epoch milliseconds value
    pub fn set_epoch_ms(&self, ms: u64) {
        *self.epoch_ms.lock() = ms;
    }

    /// Number of sleepers currently parked, waiting for a future deadline.
    pub fn pending_sleepers(&self) -> usize {
        self.waiters.lock().len()
    }

    fn wake_due(&self, now: Instant) {
        let mut waiters = self.waiters.lock();
        let still_pending = waiters
            .drain(..)
            .filter_map(|(deadline, tx)| {
                if deadline <= now {
                    let _ = tx.send(());
                    None
                } else {
                    Some((deadline, tx))
                }
            })
            .collect();
        *waiters = still_pending;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for FakeClock {
    fn now(&self) -> Instant {
        *self.current.lock()
    }

    fn epoch_ms(&self) -> u64 {
        *self.epoch_ms.lock()
    }

    async fn sleep(&self, duration: Duration) {
        let deadline = self.now() + duration;
        if deadline <= self.now() {
            return;
        }
        let (tx, rx) = oneshot::channel();
        self.waiters.lock().push((deadline, tx));
        let _ = rx.await;
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
