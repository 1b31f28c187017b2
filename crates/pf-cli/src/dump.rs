//! Card lookup against a local card-data dump.

#![allow(async_fn_in_trait)]

use std::time::{Duration, Instant};

use pf_core::{CardRecord, CardSource, Clock, ImportError, SourceError, Timer};
use pf_parser::parse_card_list;

/// Suggestions returned per autocomplete query.
pub const MAX_SUGGESTIONS: usize = 20;
/// Status reported when no card matches, as the remote provider does.
const NOT_FOUND: u16 = 404;

/// Lowercase letters and digits only, so "Jace, the Mind Sculptor" matches
/// "jace the mind sculptor".
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Cards from a bulk JSON file: a bare array or `{"data": [...]}`.
#[derive(Debug, Clone, Default)]
pub struct CardDump {
    cards: Vec<CardRecord>,
}

impl CardDump {
    #[must_use]
    pub fn new(cards: Vec<CardRecord>) -> Self {
        Self { cards }
    }

    pub fn from_json(json: &str) -> Result<Self, ImportError> {
        parse_card_list(json).map(Self::new)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    fn exact(&self, name: &str) -> Option<&CardRecord> {
        let name = name.trim();
        self.cards
            .iter()
            .find(|card| card.name.eq_ignore_ascii_case(name))
    }

    /// Shortest name containing the query, ignoring case and punctuation.
    fn fuzzy(&self, name: &str) -> Option<&CardRecord> {
        let query = normalize(name);
        if query.is_empty() {
            return None;
        }
        self.cards
            .iter()
            .filter(|card| normalize(&card.name).contains(&query))
            .min_by_key(|card| card.name.len())
    }

    /// Prefix matches first, then other matches, each alphabetical.
    fn suggestions(&self, query: &str) -> Vec<String> {
        let query = query.trim().to_lowercase();
        let mut prefixed = Vec::new();
        let mut containing = Vec::new();
        for card in &self.cards {
            let lower = card.name.to_lowercase();
            if lower.starts_with(&query) {
                prefixed.push(card.name.clone());
            } else if lower.contains(&query) {
                containing.push(card.name.clone());
            }
        }
        prefixed.sort();
        containing.sort();
        prefixed.extend(containing);
        prefixed.dedup();
        prefixed.truncate(MAX_SUGGESTIONS);
        prefixed
    }
}

impl CardSource for CardDump {
    async fn autocomplete(&self, query: &str) -> Result<Vec<String>, SourceError> {
        Ok(self.suggestions(query))
    }

    async fn fetch_exact(&self, name: &str) -> Result<CardRecord, SourceError> {
        self.exact(name).cloned().ok_or(SourceError::Status(NOT_FOUND))
    }

    async fn fetch_fuzzy(&self, name: &str) -> Result<CardRecord, SourceError> {
        self.fuzzy(name).cloned().ok_or(SourceError::Status(NOT_FOUND))
    }
}

/// Wall-clock timer that blocks the calling thread.
#[derive(Debug, Clone, Copy)]
pub struct SystemTimer {
    started: Instant,
}

impl SystemTimer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for SystemTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemTimer {
    fn now_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }
}

impl Timer for SystemTimer {
    async fn sleep_ms(&self, ms: f64) {
        if ms > 0.0 {
            std::thread::sleep(Duration::from_secs_f64(ms / 1000.0));
        }
    }
}
