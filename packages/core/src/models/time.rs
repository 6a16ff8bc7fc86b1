//! Time Provider Abstraction
//!
//! Versioning back-dates clones and publishing stamps first-publication times,
//! so every service reads the clock through `TimeProvider` to keep tests
//! deterministic.
//!
//! # Examples
//!
//! ```rust
//! use contentspace_core::models::time::{FixedTimeProvider, TimeProvider};
//! use chrono::{Duration, Utc};
//!
//! let clock = FixedTimeProvider::new(Utc::now());
//! let before = clock.now();
//! clock.advance(Duration::minutes(5));
//! assert_eq!(clock.now() - before, Duration::minutes(5));
//! ```

use chrono::{DateTime, Duration, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

/// Trait for providing current time
pub trait TimeProvider: Send + Sync {
    /// Get the current UTC time
    fn now(&self) -> DateTime<Utc>;

    /// Timestamp given to freshly cloned versions: one second before now, so a
    /// clone never sorts as newer than the item it was taken from.
    fn version_timestamp(&self) -> DateTime<Utc> {
        self.now() - Duration::seconds(1)
    }
}

/// System time provider using actual system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock with millisecond resolution.
///
/// Shareable behind `Arc<dyn TimeProvider>`; `set_time` and `advance` take
/// `&self` so tests can move time while services hold the clock.
#[derive(Debug)]
pub struct FixedTimeProvider {
    millis: AtomicI64,
}

impl FixedTimeProvider {
    pub fn new(time: DateTime<Utc>) -> Self {
        Self {
            millis: AtomicI64::new(time.timestamp_millis()),
        }
    }

    pub fn set_time(&self, time: DateTime<Utc>) {
        self.millis.store(time.timestamp_millis(), Ordering::SeqCst);
    }

    pub fn advance(&self, duration: Duration) {
        self.millis
            .fetch_add(duration.num_milliseconds(), Ordering::SeqCst);
    }
}

impl Default for FixedTimeProvider {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl TimeProvider for FixedTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp_millis(self.millis.load(Ordering::SeqCst))
            .unwrap_or_default()
    }
}
