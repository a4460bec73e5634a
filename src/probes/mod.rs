//! Signal probes
//!
//! Each probe targets one host capability and never fails past its own
//! boundary: internally it works with `Result<_, HostError>`, and at the
//! boundary any error becomes the probe's documented fallback value.

mod audio;
mod canvas;
mod environment;
mod webgl;

pub use audio::{audio_fingerprint, AUDIO_BIN_SAMPLES, AUDIO_FINGERPRINT_MAX_CHARS};
pub use canvas::{canvas_fingerprint, CANVAS_FINGERPRINT_CHARS};
pub use environment::{
    clock_signals, hardware_signals, locale_signals, privacy_signals, screen_signals, timezone,
    ClockSignals, HardwareSignals, LocaleSignals, PrivacySignals, ScreenSignals,
};
pub use webgl::webgl_info;

/// Last `n` characters of `s`
pub(crate) fn tail_chars(s: &str, n: usize) -> String {
    let len = s.chars().count();
    s.chars().skip(len.saturating_sub(n)).collect()
}

/// First `n` characters of `s`
pub(crate) fn head_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}
