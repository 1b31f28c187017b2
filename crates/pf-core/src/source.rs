//! Card-data lookup with client-side rate limiting.

#![allow(async_fn_in_trait)]

use std::cell::Cell;

use tracing::{debug, error};

use crate::{CardRecord, Clock, SourceError};

/// Minimum spacing between two requests to the card-data provider.
pub const MIN_REQUEST_INTERVAL_MS: f64 = 100.0;
/// Shorter autocomplete queries return no suggestions without a request.
pub const AUTOCOMPLETE_MIN_CHARS: usize = 2;

/// A clock that can also suspend the caller.
pub trait Timer: Clock {
    async fn sleep_ms(&self, ms: f64);
}

/// Raw access to a card-data provider.
///
/// `SourceError::Status` from a named fetch means "no such card"; any other
/// error means the provider could not be reached.
pub trait CardSource {
    async fn autocomplete(&self, query: &str) -> Result<Vec<String>, SourceError>;
    async fn fetch_exact(&self, name: &str) -> Result<CardRecord, SourceError>;
    async fn fetch_fuzzy(&self, name: &str) -> Result<CardRecord, SourceError>;
}

/// Stores user artwork somewhere reachable and returns its URL.
pub trait Uploader {
    async fn upload(&self, file_name: &str, bytes: &[u8]) -> Result<String, SourceError>;
}

/// Spaces requests at least `interval_ms` apart.
///
/// Each caller reserves its slot before suspending, so concurrent callers
/// queue behind each other instead of firing together.
#[derive(Debug)]
pub struct Throttle {
    interval_ms: f64,
    last_slot: Cell<Option<f64>>,
}

impl Throttle {
    #[must_use]
    pub const fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms,
            last_slot: Cell::new(None),
        }
    }

    pub async fn wait<T: Timer>(&self, timer: &T) {
        let now = timer.now_ms();
        let slot = match self.last_slot.get() {
            Some(last) => now.max(last + self.interval_ms),
            None => now,
        };
        self.last_slot.set(Some(slot));
        if slot > now {
            debug!(delay_ms = slot - now, "throttling card-data request");
            timer.sleep_ms(slot - now).await;
        }
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(MIN_REQUEST_INTERVAL_MS)
    }
}

/// The lookups the composer needs. Failures become empty results.
#[derive(Debug)]
pub struct CardLookup<S, T> {
    source: S,
    timer: T,
    throttle: Throttle,
}

impl<S: CardSource, T: Timer> CardLookup<S, T> {
    #[must_use]
    pub fn new(source: S, timer: T) -> Self {
        Self {
            source,
            timer,
            throttle: Throttle::default(),
        }
    }

    pub async fn autocomplete(&self, query: &str) -> Vec<String> {
        if query.chars().count() < AUTOCOMPLETE_MIN_CHARS {
            return Vec::new();
        }
        self.throttle.wait(&self.timer).await;
        match self.source.autocomplete(query).await {
            Ok(names) => names,
            Err(err) => {
                error!(query, error = %err, "autocomplete failed");
                Vec::new()
            }
        }
    }

    /// Exact name match, then fuzzy match.
    pub async fn card_by_name(&self, name: &str) -> Option<CardRecord> {
        self.throttle.wait(&self.timer).await;
        match self.source.fetch_exact(name).await {
            Ok(card) => return Some(card),
            Err(SourceError::Status(status)) => {
                debug!(name, status, "no exact match, trying fuzzy");
            }
            Err(err) => {
                error!(name, error = %err, "card lookup failed");
                return None;
            }
        }

        self.throttle.wait(&self.timer).await;
        match self.source.fetch_fuzzy(name).await {
            Ok(card) => Some(card),
            Err(SourceError::Status(status)) => {
                debug!(name, status, "no fuzzy match");
                None
            }
            Err(err) => {
                error!(name, error = %err, "card lookup failed");
                None
            }
        }
    }

    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    #[must_use]
    pub const fn timer(&self) -> &T {
        &self.timer
    }
}
