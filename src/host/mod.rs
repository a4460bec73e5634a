//! Host environment abstraction
//!
//! The collector never talks to a concrete browser. Everything it reads goes
//! through the [`Host`] trait: a browser binding, a webview embedder or a
//! test fixture each provide their own implementation. Every read is
//! optional or fallible, because any of these APIs can be missing or blocked
//! in the wild.

mod static_host;

pub use static_host::{BlockedApi, StaticHost, StaticWebGl};

use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::error::HostError;

/// Navigator properties as exposed by the host.
///
/// Fields are raw: normalization of empty or zero values happens in the
/// environment probes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorInfo {
    pub language: Option<String>,
    pub languages: Option<Vec<String>>,
    pub platform: Option<String>,
    pub webdriver: Option<bool>,
    pub hardware_concurrency: Option<u32>,
    pub device_memory: Option<f64>,
    pub max_touch_points: Option<u32>,
    pub plugin_count: Option<u32>,
    pub cookie_enabled: bool,
    pub do_not_track: Option<String>,
}

/// Screen properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenInfo {
    pub width: u32,
    pub height: u32,
    pub color_depth: u32,
}

/// Outer (browser chrome) and inner (viewport) window dimensions.
///
/// A zero dimension means the host could not measure it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowGeometry {
    pub outer_width: u32,
    pub outer_height: u32,
    pub inner_width: u32,
    pub inner_height: u32,
}

impl WindowGeometry {
    pub fn new(outer_width: u32, outer_height: u32, inner_width: u32, inner_height: u32) -> Self {
        Self {
            outer_width,
            outer_height,
            inner_width,
            inner_height,
        }
    }

    /// True when all four dimensions are non-zero
    pub fn is_measurable(&self) -> bool {
        self.outer_width > 0
            && self.outer_height > 0
            && self.inner_width > 0
            && self.inner_height > 0
    }
}

/// WebGL parameters the renderer probe reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlParameter {
    UnmaskedVendor,
    UnmaskedRenderer,
}

impl GlParameter {
    /// GL enum value from the `WEBGL_debug_renderer_info` extension
    pub fn code(self) -> u32 {
        match self {
            GlParameter::UnmaskedVendor => 0x9245,
            GlParameter::UnmaskedRenderer => 0x9246,
        }
    }
}

/// Name of the extension exposing unmasked vendor/renderer strings
pub const DEBUG_RENDERER_INFO_EXTENSION: &str = "WEBGL_debug_renderer_info";

/// An offscreen 2D drawing surface
pub trait Canvas2d {
    fn set_text_baseline(&mut self, baseline: &str);
    fn set_font(&mut self, font: &str);
    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), HostError>;
    /// Encode the surface (a `data:` URL in browsers)
    fn to_data_url(&self) -> Result<String, HostError>;
}

/// A WebGL rendering context
pub trait WebGlContext {
    /// Whether the named extension can be enabled
    fn has_extension(&self, name: &str) -> bool;
    fn get_parameter(&self, parameter: GlParameter) -> Result<Option<String>, HostError>;
}

/// An audio context wired as oscillator -> analyser -> destination
pub trait AudioGraph {
    fn connect_oscillator_to_analyser(&mut self) -> Result<(), HostError>;
    fn connect_analyser_to_destination(&mut self) -> Result<(), HostError>;
    fn start_oscillator(&mut self, when: f64) -> Result<(), HostError>;
    fn frequency_bin_count(&self) -> usize;
    /// Fill `buffer` with the analyser's current frequency data in dB
    fn get_float_frequency_data(&mut self, buffer: &mut [f32]) -> Result<(), HostError>;
    fn stop_oscillator(&mut self) -> Result<(), HostError>;
    fn close(&mut self) -> Result<(), HostError>;
}

/// Fires once when the host reports idle time
#[derive(Debug)]
pub struct IdleSignal {
    rx: oneshot::Receiver<()>,
}

/// Sending half of an [`IdleSignal`]
#[derive(Debug)]
pub struct IdleNotifier {
    tx: oneshot::Sender<()>,
}

impl IdleSignal {
    pub fn channel() -> (IdleNotifier, IdleSignal) {
        let (tx, rx) = oneshot::channel();
        (IdleNotifier { tx }, IdleSignal { rx })
    }

    /// Wait for the idle notification.
    ///
    /// Returns `false` if the notifier was dropped without firing.
    pub async fn fired(self) -> bool {
        self.rx.await.is_ok()
    }
}

impl IdleNotifier {
    pub fn notify(self) {
        // The receiver may already be gone if the deadline won
        let _ = self.tx.send(());
    }
}

/// The environment the collector runs in
pub trait Host: Send + Sync {
    /// Current wall-clock time in the host's local offset
    fn now(&self) -> DateTime<FixedOffset>;

    /// IANA timezone name, if the host resolves one
    fn timezone(&self) -> Option<String>;

    fn navigator(&self) -> NavigatorInfo;

    fn screen(&self) -> Option<ScreenInfo>;

    fn device_pixel_ratio(&self) -> Option<f64>;

    fn create_canvas_2d(&self) -> Result<Box<dyn Canvas2d>, HostError>;

    /// `Ok(None)` when WebGL is not supported
    fn create_webgl_context(&self) -> Result<Option<Box<dyn WebGlContext>>, HostError>;

    /// `Ok(None)` when Web Audio is not supported
    fn create_audio_context(&self) -> Result<Option<Box<dyn AudioGraph>>, HostError>;

    /// `None` when the window cannot be measured at all
    fn window_geometry(&self) -> Option<WindowGeometry>;

    /// Request an idle notification, with `timeout` as the host-side hint.
    ///
    /// `None` means the host has no idle signaling.
    fn idle_signal(&self, timeout: Duration) -> Option<IdleSignal>;
}
