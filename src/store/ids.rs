use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

use crate::models::RecordId;

/// Millisecond-timestamp ids that never repeat within the process.
///
/// Each id is `max(now_ms, last + 1)`, so two calls in the same millisecond
/// still get distinct, increasing values. The floor is raised past any
/// numeric id already in the catalog when it is loaded.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicU64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generator that only hands out ids strictly greater than `floor`.
    #[cfg(test)]
    pub fn with_floor(floor: u64) -> Self {
        Self {
            last: AtomicU64::new(floor),
        }
    }

    /// Makes sure future ids are strictly greater than `value`.
    pub fn observe(&self, value: u64) {
        self.last.fetch_max(value, Ordering::SeqCst);
    }

    pub fn next_id(&self) -> RecordId {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last.saturating_add(1)))
            })
            .unwrap_or_else(|last| last);
        RecordId::from(now.max(previous.saturating_add(1)))
    }
}
