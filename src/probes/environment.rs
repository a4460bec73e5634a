//! Environment read-through probes
//!
//! Hosts report absent values in different ways (missing, empty string,
//! zero). These probes fold all of them into `None` or the field default.

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};

use crate::host::{Host, NavigatorInfo};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockSignals {
    /// Positive when local time is behind UTC
    pub utc_offset_minutes: i32,
    pub browser_time_iso: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleSignals {
    pub language: Option<String>,
    pub languages: Vec<String>,
    pub platform: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreenSignals {
    pub screen_dimensions: Option<String>,
    pub color_depth: Option<u32>,
    pub pixel_ratio: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HardwareSignals {
    pub cpu_core_count: Option<u32>,
    pub device_memory_gb: Option<f64>,
    pub max_touch_points: u32,
    pub plugin_count: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrivacySignals {
    pub automation_flag: bool,
    pub cookies_enabled: bool,
    pub do_not_track: bool,
}

pub fn timezone(host: &dyn Host) -> Option<String> {
    non_empty(host.timezone())
}

pub fn clock_signals(now: DateTime<FixedOffset>) -> ClockSignals {
    ClockSignals {
        utc_offset_minutes: -(now.offset().local_minus_utc() / 60),
        browser_time_iso: now
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

pub fn locale_signals(navigator: &NavigatorInfo) -> LocaleSignals {
    LocaleSignals {
        language: non_empty(navigator.language.clone()),
        languages: navigator.languages.clone().unwrap_or_default(),
        platform: non_empty(navigator.platform.clone()),
    }
}

pub fn screen_signals(host: &dyn Host) -> ScreenSignals {
    let screen = host.screen();
    ScreenSignals {
        screen_dimensions: screen.map(|s| format!("{}x{}", s.width, s.height)),
        color_depth: screen.map(|s| s.color_depth),
        pixel_ratio: non_zero_f64(host.device_pixel_ratio()),
    }
}

pub fn hardware_signals(navigator: &NavigatorInfo) -> HardwareSignals {
    HardwareSignals {
        cpu_core_count: navigator.hardware_concurrency.filter(|&n| n > 0),
        device_memory_gb: non_zero_f64(navigator.device_memory),
        max_touch_points: navigator.max_touch_points.unwrap_or(0),
        plugin_count: navigator.plugin_count,
    }
}

pub fn privacy_signals(navigator: &NavigatorInfo) -> PrivacySignals {
    PrivacySignals {
        automation_flag: navigator.webdriver == Some(true),
        cookies_enabled: navigator.cookie_enabled,
        do_not_track: navigator.do_not_track.as_deref() == Some("1"),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn non_zero_f64(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0 && !v.is_nan())
}
