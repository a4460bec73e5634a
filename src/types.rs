//! Snapshot data types
//!
//! These types describe the single immutable record produced by one
//! signal-collection cycle.

use serde::{Deserialize, Serialize};

/// WebGL renderer identification.
///
/// Both fields are `None` when there is no WebGL context or the debug
/// renderer extension is not exposed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebGlInfo {
    pub vendor: Option<String>,
    pub renderer: Option<String>,
}

impl WebGlInfo {
    /// The placeholder used whenever the probe cannot read the renderer
    pub fn unavailable() -> Self {
        Self::default()
    }
}

/// One fully-assembled record of client signals for a page load.
///
/// Every field is independently nullable or defaulted so that a failing
/// probe never blocks construction of the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSignalSnapshot {
    /// IANA timezone reported by the host
    pub timezone: Option<String>,
    /// Minutes from local time to UTC (positive = local time behind UTC)
    pub utc_offset_minutes: i32,
    /// Host clock at assembly time, UTC with millisecond precision
    pub browser_time_iso: String,
    pub language: Option<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    pub platform: Option<String>,
    /// True only when the host self-reports as automated
    pub automation_flag: bool,
    /// Screen size as `"WxH"`
    pub screen_dimensions: Option<String>,
    pub color_depth: Option<u32>,
    pub pixel_ratio: Option<f64>,
    pub cpu_core_count: Option<u32>,
    pub device_memory_gb: Option<f64>,
    #[serde(default)]
    pub max_touch_points: u32,
    pub plugin_count: Option<u32>,
    pub cookies_enabled: bool,
    pub do_not_track: bool,
    /// Tail of the rendered-canvas encoding
    pub canvas_fingerprint: Option<String>,
    #[serde(default)]
    pub webgl_info: WebGlInfo,
    /// Truncated serialization of the analysed audio spectrum
    pub audio_fingerprint: Option<String>,
}

impl ClientSignalSnapshot {
    /// Serialize to compact JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
