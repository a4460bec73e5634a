//! Behavioral data types
//!
//! This module defines the page events the monitor listens to and the
//! record of counters they drive.

use serde::{Deserialize, Serialize};

/// How confident the devtools heuristic is that a panel is open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevtoolsConfidence {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl DevtoolsConfidence {
    /// Map a heuristic score to its confidence level
    pub fn from_score(score: u8) -> Self {
        match score {
            0 => DevtoolsConfidence::None,
            1 => DevtoolsConfidence::Low,
            2 => DevtoolsConfidence::Medium,
            _ => DevtoolsConfidence::High,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DevtoolsConfidence::None => "none",
            DevtoolsConfidence::Low => "low",
            DevtoolsConfidence::Medium => "medium",
            DevtoolsConfidence::High => "high",
        }
    }
}

/// Behavior counters for one page lifetime.
///
/// Counters only grow and flags only flip to true. `devtools_open` and
/// `devtools_confidence` belong to the devtools heuristic; every other field
/// has exactly one event handler writing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorRecord {
    pub devtools_open: bool,
    pub devtools_confidence: DevtoolsConfidence,
    pub copy_count: u64,
    pub print_attempt: bool,
    pub tab_switch_count: u64,
    pub devtools_shortcut_seen: bool,
    /// Unix milliseconds at which monitoring began
    pub start_time_ms: i64,
    /// Deepest scroll position reached, 0-100
    pub max_scroll_depth_percent: u8,
    pub click_count: u64,
}

impl BehaviorRecord {
    pub fn new(start_time_ms: i64) -> Self {
        Self {
            devtools_open: false,
            devtools_confidence: DevtoolsConfidence::None,
            copy_count: 0,
            print_attempt: false,
            tab_switch_count: 0,
            devtools_shortcut_seen: false,
            start_time_ms,
            max_scroll_depth_percent: 0,
            click_count: 0,
        }
    }
}

/// A keydown with its modifier state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyChord {
    /// Key value as reported by the host (e.g. `"I"`, `"F12"`)
    pub key: String,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub meta: bool,
}

impl KeyChord {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    /// Whether this chord is a conventional "open developer tools" shortcut.
    ///
    /// Matches F12, Ctrl+Shift+I/J, and the macOS Cmd+Option+I/J chords.
    pub fn opens_devtools(&self) -> bool {
        if self.key == "F12" {
            return true;
        }
        let inspector_key =
            self.key.eq_ignore_ascii_case("i") || self.key.eq_ignore_ascii_case("j");
        inspector_key && ((self.ctrl && self.shift) || (self.meta && self.alt))
    }
}

/// Scroll position at the time of a scroll event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollMetrics {
    /// Vertical scroll offset in CSS pixels
    pub scroll_y: f64,
    pub viewport_height: f64,
    /// Total scrollable document height
    pub document_height: f64,
}

impl ScrollMetrics {
    /// Percentage of the document seen so far, rounded and clamped to 0-100.
    ///
    /// `None` when the document height makes the ratio meaningless.
    pub fn depth_percent(&self) -> Option<u8> {
        let percent = (self.scroll_y + self.viewport_height) / self.document_height * 100.0;
        if !percent.is_finite() {
            return None;
        }
        Some(percent.round().clamp(0.0, 100.0) as u8)
    }
}

/// Page events the behavior monitor reacts to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageEvent {
    Copy,
    BeforePrint,
    VisibilityChange { hidden: bool },
    KeyDown(KeyChord),
    Scroll(ScrollMetrics),
    Click,
}

impl PageEvent {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
