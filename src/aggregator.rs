//! Signal aggregation
//!
//! Runs the probe set once, joins the asynchronous audio measurement, and
//! publishes a single immutable [`ClientSignalSnapshot`] to [`SignalState`].

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::host::Host;
use crate::probes::{
    self, ClockSignals, HardwareSignals, LocaleSignals, PrivacySignals, ScreenSignals,
};
use crate::types::{ClientSignalSnapshot, WebGlInfo};

/// The published snapshot slot.
///
/// Only the aggregator writes it; any number of readers may call
/// [`SignalState::current`] at any time.
#[derive(Debug, Default)]
pub struct SignalState {
    slot: RwLock<Option<Arc<ClientSignalSnapshot>>>,
    publications: AtomicU32,
}

impl SignalState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently published snapshot, if any
    pub fn current(&self) -> Option<Arc<ClientSignalSnapshot>> {
        self.slot.read().clone()
    }

    /// How many snapshots have been published so far
    pub fn publication_count(&self) -> u32 {
        self.publications.load(Ordering::Acquire)
    }

    fn publish(&self, snapshot: ClientSignalSnapshot) -> Arc<ClientSignalSnapshot> {
        let snapshot = Arc::new(snapshot);
        *self.slot.write() = Some(Arc::clone(&snapshot));
        let count = self.publications.fetch_add(1, Ordering::AcqRel) + 1;
        log::info!("client signal snapshot published (#{count})");
        snapshot
    }
}

/// Everything the synchronous probes produce
struct SyncSignals {
    timezone: Option<String>,
    locale: LocaleSignals,
    screen: ScreenSignals,
    hardware: HardwareSignals,
    privacy: PrivacySignals,
    canvas_fingerprint: Option<String>,
    webgl_info: WebGlInfo,
}

impl SyncSignals {
    fn gather(host: &dyn Host) -> Self {
        let navigator = host.navigator();
        Self {
            timezone: probes::timezone(host),
            locale: probes::locale_signals(&navigator),
            screen: probes::screen_signals(host),
            hardware: probes::hardware_signals(&navigator),
            privacy: probes::privacy_signals(&navigator),
            canvas_fingerprint: probes::canvas_fingerprint(host),
            webgl_info: probes::webgl_info(host),
        }
    }

    fn assemble(
        self,
        clock: ClockSignals,
        audio_fingerprint: Option<String>,
    ) -> ClientSignalSnapshot {
        ClientSignalSnapshot {
            timezone: self.timezone,
            utc_offset_minutes: clock.utc_offset_minutes,
            browser_time_iso: clock.browser_time_iso,
            language: self.locale.language,
            languages: self.locale.languages,
            platform: self.locale.platform,
            automation_flag: self.privacy.automation_flag,
            screen_dimensions: self.screen.screen_dimensions,
            color_depth: self.screen.color_depth,
            pixel_ratio: self.screen.pixel_ratio,
            cpu_core_count: self.hardware.cpu_core_count,
            device_memory_gb: self.hardware.device_memory_gb,
            max_touch_points: self.hardware.max_touch_points,
            plugin_count: self.hardware.plugin_count,
            cookies_enabled: self.privacy.cookies_enabled,
            do_not_track: self.privacy.do_not_track,
            canvas_fingerprint: self.canvas_fingerprint,
            webgl_info: self.webgl_info,
            audio_fingerprint,
        }
    }
}

/// Orchestrates one collection cycle against a host
#[derive(Clone)]
pub struct SignalAggregator {
    host: Arc<dyn Host>,
    state: Arc<SignalState>,
}

impl SignalAggregator {
    pub fn new(host: Arc<dyn Host>, state: Arc<SignalState>) -> Self {
        Self { host, state }
    }

    pub fn host(&self) -> &Arc<dyn Host> {
        &self.host
    }

    pub fn state(&self) -> &Arc<SignalState> {
        &self.state
    }

    /// Collect, publish and return a fresh snapshot.
    ///
    /// If the audio task dies instead of settling, the last published
    /// snapshot is returned (or `None` when nothing was published yet).
    /// Calling this again overwrites the slot with a new snapshot.
    pub async fn collect(&self) -> Option<Arc<ClientSignalSnapshot>> {
        let host = Arc::clone(&self.host);
        let audio = tokio::spawn(async move { probes::audio_fingerprint(host.as_ref()).await });

        let signals = SyncSignals::gather(self.host.as_ref());

        match audio.await {
            Ok(audio_fingerprint) => {
                let clock = probes::clock_signals(self.host.now());
                Some(self.state.publish(signals.assemble(clock, audio_fingerprint)))
            }
            Err(e) => {
                log::warn!("signal aggregation failed, keeping last snapshot: {e}");
                self.state.current()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HostError;
    use crate::host::{
        AudioGraph, BlockedApi, Canvas2d, IdleSignal, NavigatorInfo, ScreenInfo, StaticHost,
        StaticWebGl, WebGlContext, WindowGeometry,
    };
    use chrono::{DateTime, FixedOffset};
    use pretty_assertions::assert_eq;
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;

    fn full_host() -> StaticHost {
        StaticHost {
            now: Some(DateTime::parse_from_rfc3339("2024-06-01T12:30:00+03:00").unwrap()),
            timezone: Some("Europe/Bucharest".to_string()),
            navigator: NavigatorInfo {
                language: Some("ro-RO".to_string()),
                languages: Some(vec!["ro-RO".to_string(), "en-US".to_string()]),
                platform: Some("Win32".to_string()),
                webdriver: Some(false),
                hardware_concurrency: Some(12),
                device_memory: Some(8.0),
                max_touch_points: Some(0),
                plugin_count: Some(5),
                cookie_enabled: true,
                do_not_track: None,
            },
            screen: Some(ScreenInfo {
                width: 1920,
                height: 1080,
                color_depth: 24,
            }),
            device_pixel_ratio: Some(1.25),
            canvas_data_url: Some(format!("data:image/png;base64,{}", "Q".repeat(80))),
            webgl: Some(StaticWebGl {
                debug_renderer_info: true,
                vendor: Some("Google Inc. (Intel)".to_string()),
                renderer: Some("ANGLE (Intel UHD 620)".to_string()),
            }),
            audio_spectrum: Some(vec![-130.5; 1024]),
            ..Default::default()
        }
    }

    async fn collect_from(host: StaticHost) -> Arc<ClientSignalSnapshot> {
        let aggregator = SignalAggregator::new(Arc::new(host), Arc::new(SignalState::new()));
        aggregator.collect().await.expect("snapshot")
    }

    #[tokio::test]
    async fn test_collect_assembles_all_signals() {
        let snapshot = collect_from(full_host()).await;

        assert_eq!(snapshot.timezone.as_deref(), Some("Europe/Bucharest"));
        assert_eq!(snapshot.utc_offset_minutes, -180);
        assert_eq!(snapshot.browser_time_iso, "2024-06-01T09:30:00.000Z");
        assert_eq!(snapshot.languages, vec!["ro-RO", "en-US"]);
        assert_eq!(snapshot.screen_dimensions.as_deref(), Some("1920x1080"));
        assert_eq!(snapshot.cpu_core_count, Some(12));
        assert!(!snapshot.automation_flag);
        assert_eq!(snapshot.canvas_fingerprint, Some("Q".repeat(50)));
        assert_eq!(snapshot.webgl_info.vendor.as_deref(), Some("Google Inc. (Intel)"));
        let audio = snapshot.audio_fingerprint.as_deref().unwrap();
        assert!(audio.starts_with("-130.5,-130.5"));
        assert_eq!(audio.chars().count(), 50);
    }

    #[tokio::test]
    async fn test_probe_failures_only_touch_their_own_field() {
        let full = collect_from(full_host()).await;

        let mut no_canvas = full_host();
        no_canvas.blocked.push(BlockedApi::Canvas);
        assert_eq!(
            *collect_from(no_canvas).await,
            ClientSignalSnapshot {
                canvas_fingerprint: None,
                ..(*full).clone()
            }
        );

        let mut no_webgl = full_host();
        no_webgl.webgl = None;
        assert_eq!(
            *collect_from(no_webgl).await,
            ClientSignalSnapshot {
                webgl_info: WebGlInfo::unavailable(),
                ..(*full).clone()
            }
        );

        let mut no_audio = full_host();
        no_audio.blocked.push(BlockedApi::Audio);
        assert_eq!(
            *collect_from(no_audio).await,
            ClientSignalSnapshot {
                audio_fingerprint: None,
                ..(*full).clone()
            }
        );
    }

    #[tokio::test]
    async fn test_bare_host_still_publishes() {
        let snapshot = collect_from(StaticHost::default()).await;
        assert_eq!(snapshot.timezone, None);
        assert_eq!(snapshot.screen_dimensions, None);
        assert_eq!(snapshot.canvas_fingerprint, None);
        assert_eq!(snapshot.webgl_info, WebGlInfo::unavailable());
        assert_eq!(snapshot.audio_fingerprint, None);
        assert_eq!(snapshot.max_touch_points, 0);
    }

    #[tokio::test]
    async fn test_publishes_to_shared_state() {
        let state = Arc::new(SignalState::new());
        let aggregator = SignalAggregator::new(Arc::new(full_host()), Arc::clone(&state));
        assert!(state.current().is_none());

        let first = aggregator.collect().await.unwrap();
        assert_eq!(state.publication_count(), 1);
        assert!(Arc::ptr_eq(&first, &state.current().unwrap()));

        let second = aggregator.collect().await.unwrap();
        assert_eq!(state.publication_count(), 2);
        assert!(Arc::ptr_eq(&second, &state.current().unwrap()));
        assert!(!Arc::ptr_eq(&first, &second));
    }

    /// Host whose audio stack panics on demand
    struct PanickingAudioHost {
        inner: StaticHost,
        panic_audio: AtomicBool,
    }

    impl Host for PanickingAudioHost {
        fn now(&self) -> DateTime<FixedOffset> {
            self.inner.now()
        }
        fn timezone(&self) -> Option<String> {
            self.inner.timezone()
        }
        fn navigator(&self) -> NavigatorInfo {
            self.inner.navigator()
        }
        fn screen(&self) -> Option<ScreenInfo> {
            self.inner.screen()
        }
        fn device_pixel_ratio(&self) -> Option<f64> {
            self.inner.device_pixel_ratio()
        }
        fn create_canvas_2d(&self) -> Result<Box<dyn Canvas2d>, HostError> {
            self.inner.create_canvas_2d()
        }
        fn create_webgl_context(&self) -> Result<Option<Box<dyn WebGlContext>>, HostError> {
            self.inner.create_webgl_context()
        }
        fn create_audio_context(&self) -> Result<Option<Box<dyn AudioGraph>>, HostError> {
            if self.panic_audio.load(Ordering::SeqCst) {
                panic!("audio stack crashed");
            }
            self.inner.create_audio_context()
        }
        fn window_geometry(&self) -> Option<WindowGeometry> {
            None
        }
        fn idle_signal(&self, _timeout: Duration) -> Option<IdleSignal> {
            None
        }
    }

    #[tokio::test]
    async fn test_failed_join_returns_last_snapshot() {
        let host = Arc::new(PanickingAudioHost {
            inner: full_host(),
            panic_audio: AtomicBool::new(false),
        });
        let state = Arc::new(SignalState::new());
        let aggregator = SignalAggregator::new(host.clone(), Arc::clone(&state));

        let first = aggregator.collect().await.unwrap();
        host.panic_audio.store(true, Ordering::SeqCst);

        let recovered = aggregator.collect().await.unwrap();
        assert!(Arc::ptr_eq(&first, &recovered));
        assert_eq!(state.publication_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_join_without_prior_snapshot_is_none() {
        let host = Arc::new(PanickingAudioHost {
            inner: full_host(),
            panic_audio: AtomicBool::new(true),
        });
        let state = Arc::new(SignalState::new());
        let aggregator = SignalAggregator::new(host, Arc::clone(&state));

        assert!(aggregator.collect().await.is_none());
        assert_eq!(state.publication_count(), 0);
    }
}
