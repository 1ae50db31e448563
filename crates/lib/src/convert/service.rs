//! Process-wide conversion state.
//!
//! Date parsing is comparatively slow and payloads repeat the same stamps
//! over and over, so parses are memoized. The memo is bounded: once full it
//! is emptied and starts over.

use std::{
    collections::HashMap,
    sync::{Arc, OnceLock, PoisonError, RwLock},
};

use chrono::{DateTime, Utc};

use super::date::DateFormat;
use crate::constants::DATE_MEMO_CAPACITY;

type MemoKey = (DateFormat, String);

/// Shared conversion helpers and their caches.
///
/// Models take one through [`crate::model::ModelOptions`]; sub-models use
/// their parent's.
#[derive(Debug)]
pub struct ConversionService {
    fallback: Vec<DateFormat>,
    memo: RwLock<HashMap<MemoKey, Option<DateTime<Utc>>>>,
    capacity: usize,
}

impl ConversionService {
    pub fn new() -> Self {
        Self::with_memo_capacity(DATE_MEMO_CAPACITY)
    }

    pub fn with_memo_capacity(capacity: usize) -> Self {
        Self {
            fallback: DateFormat::ALL.to_vec(),
            memo: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    /// Replaces the grammars tried after a field's preferred one.
    pub fn with_fallback_order(mut self, order: Vec<DateFormat>) -> Self {
        self.fallback = order;
        self
    }

    /// The service used when none is configured.
    pub fn shared() -> Arc<ConversionService> {
        static SHARED: OnceLock<Arc<ConversionService>> = OnceLock::new();
        Arc::clone(SHARED.get_or_init(|| Arc::new(ConversionService::new())))
    }

    /// Parses `text`, trying `preferred` first and then the fallback order.
    pub fn parse_date(&self, text: &str, preferred: DateFormat) -> Option<DateTime<Utc>> {
        let key = (preferred, text.to_string());
        if let Some(hit) = self
            .memo
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return *hit;
        }

        let parsed = preferred.parse(text).or_else(|| {
            self.fallback
                .iter()
                .filter(|format| **format != preferred)
                .find_map(|format| format.parse(text))
        });
        if parsed.is_none() {
            tracing::debug!(text, ?preferred, "no date grammar matched");
        }

        let mut memo = self.memo.write().unwrap_or_else(PoisonError::into_inner);
        if memo.len() >= self.capacity {
            tracing::trace!(capacity = self.capacity, "date memo full, resetting");
            memo.clear();
        }
        memo.insert(key, parsed);
        parsed
    }

    pub fn format_date(&self, at: &DateTime<Utc>, format: DateFormat) -> String {
        format.format(at)
    }

    /// Number of memoized parses.
    pub fn memo_len(&self) -> usize {
        self.memo.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Default for ConversionService {
    fn default() -> Self {
        Self::new()
    }
}
