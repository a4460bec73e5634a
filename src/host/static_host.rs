//! Fixed-value host
//!
//! A host described entirely by data. The CLI loads one from JSON to run the
//! pipeline offline, and tests use it to simulate missing or failing APIs.

use std::time::Duration;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use super::{
    AudioGraph, Canvas2d, GlParameter, Host, IdleSignal, NavigatorInfo, ScreenInfo, WebGlContext,
    WindowGeometry, DEBUG_RENDERER_INFO_EXTENSION,
};
use crate::error::HostError;

/// Host APIs that can be made to fail on creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockedApi {
    Canvas,
    Webgl,
    Audio,
}

/// WebGL renderer strings exposed by a [`StaticHost`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticWebGl {
    /// Whether `WEBGL_debug_renderer_info` is exposed
    pub debug_renderer_info: bool,
    pub vendor: Option<String>,
    pub renderer: Option<String>,
}

/// A host whose every answer is fixed up front
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticHost {
    /// Clock value; the real UTC clock when absent
    pub now: Option<DateTime<FixedOffset>>,
    pub timezone: Option<String>,
    pub navigator: NavigatorInfo,
    pub screen: Option<ScreenInfo>,
    pub device_pixel_ratio: Option<f64>,
    /// Canvas encoding; canvas creation fails when absent
    pub canvas_data_url: Option<String>,
    /// WebGL support; no context when absent
    pub webgl: Option<StaticWebGl>,
    /// Analyser output; Web Audio unsupported when absent
    pub audio_spectrum: Option<Vec<f32>>,
    pub geometry: Option<WindowGeometry>,
    /// Fire the idle signal after this delay; no idle signaling when absent
    pub idle_after_ms: Option<u64>,
    /// APIs whose creation raises an error
    pub blocked: Vec<BlockedApi>,
}

impl StaticHost {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    fn is_blocked(&self, api: BlockedApi) -> bool {
        self.blocked.contains(&api)
    }
}

impl Host for StaticHost {
    fn now(&self) -> DateTime<FixedOffset> {
        self.now.unwrap_or_else(|| Utc::now().into())
    }

    fn timezone(&self) -> Option<String> {
        self.timezone.clone()
    }

    fn navigator(&self) -> NavigatorInfo {
        self.navigator.clone()
    }

    fn screen(&self) -> Option<ScreenInfo> {
        self.screen
    }

    fn device_pixel_ratio(&self) -> Option<f64> {
        self.device_pixel_ratio
    }

    fn create_canvas_2d(&self) -> Result<Box<dyn Canvas2d>, HostError> {
        if self.is_blocked(BlockedApi::Canvas) {
            return Err(HostError::CallFailed("canvas blocked".to_string()));
        }
        Ok(Box::new(StaticCanvas {
            data_url: self.canvas_data_url.clone(),
        }))
    }

    fn create_webgl_context(&self) -> Result<Option<Box<dyn WebGlContext>>, HostError> {
        if self.is_blocked(BlockedApi::Webgl) {
            return Err(HostError::CallFailed("webgl blocked".to_string()));
        }
        Ok(self
            .webgl
            .clone()
            .map(|gl| Box::new(gl) as Box<dyn WebGlContext>))
    }

    fn create_audio_context(&self) -> Result<Option<Box<dyn AudioGraph>>, HostError> {
        if self.is_blocked(BlockedApi::Audio) {
            return Err(HostError::CallFailed("audio context blocked".to_string()));
        }
        Ok(self.audio_spectrum.clone().map(|spectrum| {
            Box::new(StaticAudio {
                spectrum,
                started: false,
            }) as Box<dyn AudioGraph>
        }))
    }

    fn window_geometry(&self) -> Option<WindowGeometry> {
        self.geometry
    }

    fn idle_signal(&self, _timeout: Duration) -> Option<IdleSignal> {
        let delay = Duration::from_millis(self.idle_after_ms?);
        let (notifier, signal) = IdleSignal::channel();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            notifier.notify();
        });
        Some(signal)
    }
}

struct StaticCanvas {
    data_url: Option<String>,
}

impl Canvas2d for StaticCanvas {
    fn set_text_baseline(&mut self, _baseline: &str) {}

    fn set_font(&mut self, _font: &str) {}

    fn fill_text(&mut self, _text: &str, _x: f64, _y: f64) -> Result<(), HostError> {
        Ok(())
    }

    fn to_data_url(&self) -> Result<String, HostError> {
        self.data_url
            .clone()
            .ok_or_else(|| HostError::CallFailed("canvas encoding refused".to_string()))
    }
}

impl WebGlContext for StaticWebGl {
    fn has_extension(&self, name: &str) -> bool {
        self.debug_renderer_info && name == DEBUG_RENDERER_INFO_EXTENSION
    }

    fn get_parameter(&self, parameter: GlParameter) -> Result<Option<String>, HostError> {
        if !self.debug_renderer_info {
            return Err(HostError::Unavailable(format!(
                "GL parameter {:#x}",
                parameter.code()
            )));
        }
        Ok(match parameter {
            GlParameter::UnmaskedVendor => self.vendor.clone(),
            GlParameter::UnmaskedRenderer => self.renderer.clone(),
        })
    }
}

struct StaticAudio {
    spectrum: Vec<f32>,
    started: bool,
}

impl AudioGraph for StaticAudio {
    fn connect_oscillator_to_analyser(&mut self) -> Result<(), HostError> {
        Ok(())
    }

    fn connect_analyser_to_destination(&mut self) -> Result<(), HostError> {
        Ok(())
    }

    fn start_oscillator(&mut self, _when: f64) -> Result<(), HostError> {
        self.started = true;
        Ok(())
    }

    fn frequency_bin_count(&self) -> usize {
        self.spectrum.len()
    }

    fn get_float_frequency_data(&mut self, buffer: &mut [f32]) -> Result<(), HostError> {
        if !self.started {
            buffer.fill(f32::NEG_INFINITY);
            return Ok(());
        }
        let n = buffer.len().min(self.spectrum.len());
        buffer[..n].copy_from_slice(&self.spectrum[..n]);
        Ok(())
    }

    fn stop_oscillator(&mut self) -> Result<(), HostError> {
        self.started = false;
        Ok(())
    }

    fn close(&mut self) -> Result<(), HostError> {
        Ok(())
    }
}
