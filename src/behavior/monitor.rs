//! Behavior monitor
//!
//! Owns the page's [`BehaviorRecord`] and exposes one handler per page event.
//! Handlers run to completion under a short write lock, so readers always
//! observe a consistent record.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::behavior::devtools::DevToolsReading;
use crate::behavior::types::{BehaviorRecord, KeyChord, PageEvent, ScrollMetrics};

/// Shared handle to the behavior record.
///
/// Cloning shares the same record.
#[derive(Debug, Clone)]
pub struct BehaviorMonitor {
    record: Arc<RwLock<BehaviorRecord>>,
}

impl BehaviorMonitor {
    pub fn new(start_time_ms: i64) -> Self {
        Self {
            record: Arc::new(RwLock::new(BehaviorRecord::new(start_time_ms))),
        }
    }

    /// Start monitoring from the current wall-clock time
    pub fn starting_now() -> Self {
        Self::new(chrono::Utc::now().timestamp_millis())
    }

    /// Up-to-date copy of the record
    pub fn snapshot(&self) -> BehaviorRecord {
        self.record.read().clone()
    }

    pub fn record_copy(&self) {
        self.record.write().copy_count += 1;
    }

    pub fn record_before_print(&self) {
        self.record.write().print_attempt = true;
    }

    /// Only transitions to hidden count as a tab switch
    pub fn record_visibility_change(&self, hidden: bool) {
        if hidden {
            self.record.write().tab_switch_count += 1;
        }
    }

    pub fn record_key_down(&self, chord: &KeyChord) {
        if chord.opens_devtools() {
            let mut record = self.record.write();
            if !record.devtools_shortcut_seen {
                log::debug!("devtools shortcut pressed: {}", chord.key);
            }
            record.devtools_shortcut_seen = true;
        }
    }

    pub fn record_scroll(&self, metrics: &ScrollMetrics) {
        let Some(depth) = metrics.depth_percent() else {
            return;
        };
        let mut record = self.record.write();
        record.max_scroll_depth_percent = record.max_scroll_depth_percent.max(depth);
    }

    pub fn record_click(&self) {
        self.record.write().click_count += 1;
    }

    /// Route a page event to its handler
    pub fn dispatch(&self, event: &PageEvent) {
        match event {
            PageEvent::Copy => self.record_copy(),
            PageEvent::BeforePrint => self.record_before_print(),
            PageEvent::VisibilityChange { hidden } => self.record_visibility_change(*hidden),
            PageEvent::KeyDown(chord) => self.record_key_down(chord),
            PageEvent::Scroll(metrics) => self.record_scroll(metrics),
            PageEvent::Click => self.record_click(),
        }
    }

    /// Write the devtools fields. Reserved for the devtools heuristic.
    pub(crate) fn apply_devtools(&self, reading: &DevToolsReading) {
        let mut record = self.record.write();
        if record.devtools_open != reading.open {
            log::info!(
                "devtools {} (confidence {})",
                if reading.open { "detected" } else { "cleared" },
                reading.confidence.as_str()
            );
        }
        record.devtools_open = reading.open;
        record.devtools_confidence = reading.confidence;
    }
}
