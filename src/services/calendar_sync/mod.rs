//! Refresh controller for one calendar feed.
//! Loads the document, expands it for the configured window and publishes the
//! result as an immutable snapshot, at most once per throttle interval.

pub mod fetcher;
pub mod scheduler;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, TryLockError};
use std::time::Duration as StdDuration;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::error::RefreshError;
use crate::models::calendar_source::CalendarSource;
use crate::models::occurrence::{Occurrence, OccurrenceList};
use crate::services::event::{queries, EventService, QueryWindow};
use crate::services::icalendar::import;

pub use fetcher::{CalendarLoader, IcsFetcher};
pub use scheduler::RefreshThrottle;

/// State published by the last successful pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarSnapshot {
    pub occurrences: OccurrenceList,
    /// First occurrence with `end > now` at refresh time.
    pub next: Option<Occurrence>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Refreshed { occurrences: usize },
    /// The last pass is too recent; the cached snapshot stands.
    Throttled,
    /// Another caller is refreshing right now.
    InProgress,
}

pub struct CalendarFeed<L = IcsFetcher> {
    source: CalendarSource,
    default_tz: Tz,
    loader: L,
    throttle: Mutex<RefreshThrottle>,
    snapshot: RwLock<Arc<CalendarSnapshot>>,
    parse_passes: AtomicUsize,
}

impl CalendarFeed<IcsFetcher> {
    /// Feed backed by the URL in `source`.
    pub fn from_source(source: CalendarSource) -> Result<Self> {
        let fetcher = IcsFetcher::from_source(&source)?;
        Self::new(source, fetcher)
    }
}

impl<L: CalendarLoader> CalendarFeed<L> {
    pub fn new(source: CalendarSource, loader: L) -> Result<Self> {
        source.validate().map_err(|err| anyhow!(err))?;
        let default_tz = source.timezone()?;
        let throttle = RefreshThrottle::from_seconds(source.min_refresh_seconds);

        Ok(Self {
            source,
            default_tz,
            loader,
            throttle: Mutex::new(throttle),
            snapshot: RwLock::new(Arc::new(CalendarSnapshot::default())),
            parse_passes: AtomicUsize::new(0),
        })
    }

    pub fn source(&self) -> &CalendarSource {
        &self.source
    }

    pub fn default_timezone(&self) -> Tz {
        self.default_tz
    }

    pub fn refresh(&self) -> Result<RefreshOutcome, RefreshError> {
        self.refresh_at(Utc::now())
    }

    /// Run one pass as of `now`, unless throttled or already running.
    ///
    /// On failure the previous snapshot is kept and no run is recorded.
    pub fn refresh_at(&self, now: DateTime<Utc>) -> Result<RefreshOutcome, RefreshError> {
        let mut throttle = match self.throttle.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                log::debug!("Refresh of '{}' already running", self.source.name);
                return Ok(RefreshOutcome::InProgress);
            }
        };

        if !throttle.should_run(now) {
            log::debug!(
                "Refresh of '{}' throttled for another {:?}",
                self.source.name,
                throttle.next_due_in(now)
            );
            return Ok(RefreshOutcome::Throttled);
        }

        let window = QueryWindow::starting_today(now, &self.default_tz, self.source.days).ok_or(
            RefreshError::WindowOutOfRange {
                days: self.source.days,
                from: now,
            },
        )?;

        let content = fetcher::strip_nul_bytes(self.loader.load().map_err(RefreshError::Load)?);
        let records = import::from_str(&content)?;
        self.parse_passes.fetch_add(1, Ordering::SeqCst);

        let occurrences = EventService::new(window, self.default_tz).expand_events(&records);
        let next = queries::next_after(&occurrences, now.with_timezone(&self.default_tz));
        let count = occurrences.len();

        let snapshot = Arc::new(CalendarSnapshot {
            occurrences,
            next,
            refreshed_at: Some(now),
        });
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
        throttle.mark_run(now);

        log::info!(
            "Refreshed '{}': {} events, {} occurrences between {} and {}",
            self.source.name,
            records.len(),
            count,
            window.from,
            window.to
        );
        Ok(RefreshOutcome::Refreshed { occurrences: count })
    }

    /// Stored occurrences overlapping `[window_start, window_end)`.
    pub fn occurrences_in(&self, window_start: DateTime<Tz>, window_end: DateTime<Tz>) -> Vec<Occurrence> {
        queries::overlapping(&self.snapshot().occurrences, window_start, window_end)
    }

    pub fn next_occurrence(&self) -> Option<Occurrence> {
        self.snapshot().next.clone()
    }

    pub fn snapshot(&self) -> Arc<CalendarSnapshot> {
        Arc::clone(&*self.snapshot.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Documents parsed so far.
    pub fn parse_passes(&self) -> usize {
        self.parse_passes.load(Ordering::SeqCst)
    }

    pub fn next_due_in(&self, now: DateTime<Utc>) -> StdDuration {
        self.throttle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .next_due_in(now)
    }
}

impl<L: CalendarLoader + 'static> CalendarFeed<L> {
    /// Refresh on the blocking pool; loaders may block on network I/O.
    pub fn refresh_in_background(
        self: Arc<Self>,
    ) -> tokio::task::JoinHandle<Result<RefreshOutcome, RefreshError>> {
        tokio::task::spawn_blocking(move || self.refresh())
    }
}
