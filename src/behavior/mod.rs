//! In-page behavior monitoring
//!
//! This module tracks user and page behavior over a page's lifetime: copy,
//! print, tab switches, devtools shortcuts, scroll depth and clicks, plus a
//! debounced devtools-open inference from window geometry.
//!
//! Pipeline: Page events → BehaviorMonitor ← DevToolsHeuristic (sampled)

pub mod devtools;
pub mod monitor;
pub mod types;

pub use devtools::{spawn_devtools_sampler, DevToolsHeuristic, DevToolsReading};
pub use monitor::BehaviorMonitor;
pub use types::{BehaviorRecord, DevtoolsConfidence, KeyChord, PageEvent, ScrollMetrics};
