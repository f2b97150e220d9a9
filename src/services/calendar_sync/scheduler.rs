use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};

/// Minimum spacing between refresh passes.
pub const DEFAULT_MIN_INTERVAL_SECONDS: i64 = 120;

/// Rate limiter for refresh passes: at most one per `min_interval`.
#[derive(Debug, Clone)]
pub struct RefreshThrottle {
    min_interval: Duration,
    last_run_at: Option<DateTime<Utc>>,
}

impl Default for RefreshThrottle {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_MIN_INTERVAL_SECONDS))
    }
}

impl RefreshThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval: min_interval.max(Duration::zero()),
            last_run_at: None,
        }
    }

    pub fn from_seconds(seconds: u64) -> Self {
        Self::new(Duration::seconds(i64::try_from(seconds).unwrap_or(i64::MAX / 1000)))
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    pub fn last_run_at(&self) -> Option<DateTime<Utc>> {
        self.last_run_at
    }

    /// True before the first recorded run, then once `min_interval` has passed.
    pub fn should_run(&self, now: DateTime<Utc>) -> bool {
        self.last_run_at
            .map_or(true, |last_run_at| now - last_run_at > self.min_interval)
    }

    pub fn mark_run(&mut self, now: DateTime<Utc>) {
        self.last_run_at = Some(now);
    }

    /// Time left until the next pass is allowed; zero when already due.
    pub fn next_due_in(&self, now: DateTime<Utc>) -> StdDuration {
        let Some(last_run_at) = self.last_run_at else {
            return StdDuration::from_secs(0);
        };

        // Past the end of the representable range, a full interval is left.
        let delta = match last_run_at.checked_add_signed(self.min_interval) {
            Some(due_at) => due_at - now,
            None => self.min_interval,
        };
        delta.to_std().unwrap_or(StdDuration::ZERO)
    }
}
