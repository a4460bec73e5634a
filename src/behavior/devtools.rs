//! DevTools-open heuristic
//!
//! A docked devtools panel takes space from the viewport, so the outer
//! window is noticeably larger than the inner one. Single samples are noisy
//! (resizes, toolbars, zoom), so a bounded score debounces the inference:
//! each suspicious sample raises it by one, each clean sample lowers it by
//! one, and the panel counts as open only from [`OPEN_SCORE`] upwards.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::behavior::monitor::BehaviorMonitor;
use crate::behavior::types::DevtoolsConfidence;
use crate::config::DevToolsConfig;
use crate::host::{Host, WindowGeometry};

/// Upper bound of the score
pub const MAX_SCORE: u8 = 5;

/// Score at which devtools are reported open
pub const OPEN_SCORE: u8 = 3;

/// Result of one measurable sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DevToolsReading {
    pub score: u8,
    pub suspected: bool,
    pub open: bool,
    pub confidence: DevtoolsConfidence,
}

impl DevToolsReading {
    fn from_score(score: u8, suspected: bool) -> Self {
        Self {
            score,
            suspected,
            open: score >= OPEN_SCORE,
            confidence: DevtoolsConfidence::from_score(score),
        }
    }
}

/// Score-based devtools detector
#[derive(Debug, Clone)]
pub struct DevToolsHeuristic {
    config: DevToolsConfig,
    score: u8,
}

impl Default for DevToolsHeuristic {
    fn default() -> Self {
        Self::new(DevToolsConfig::default())
    }
}

impl DevToolsHeuristic {
    pub fn new(config: DevToolsConfig) -> Self {
        Self { config, score: 0 }
    }

    pub fn score(&self) -> u8 {
        self.score
    }

    /// Current state without sampling
    pub fn reading(&self) -> DevToolsReading {
        DevToolsReading::from_score(self.score, false)
    }

    /// Gap threshold for this window: the base threshold, raised on large
    /// windows in proportion to the smaller outer dimension
    pub fn threshold(&self, geometry: &WindowGeometry) -> u32 {
        let base = geometry.outer_width.min(geometry.outer_height);
        let scaled = (f64::from(base) * self.config.threshold_ratio).round() as u32;
        self.config.base_threshold_px.max(scaled)
    }

    /// Small viewports are never suspected: a mobile layout and a docked
    /// panel look the same to this method
    pub fn is_small_viewport(&self, geometry: &WindowGeometry) -> bool {
        geometry.inner_width < self.config.small_viewport_width
            || geometry.inner_height < self.config.small_viewport_height
    }

    pub fn is_suspected(&self, geometry: &WindowGeometry) -> bool {
        if self.is_small_viewport(geometry) {
            return false;
        }
        let threshold = self.threshold(geometry);
        let width_gap = geometry.outer_width.abs_diff(geometry.inner_width);
        let height_gap = geometry.outer_height.abs_diff(geometry.inner_height);
        width_gap > threshold || height_gap > threshold
    }

    /// Advance the state machine by one sample.
    ///
    /// Returns `None` and leaves the score untouched when the geometry is
    /// missing or any dimension is zero.
    pub fn step(&mut self, geometry: Option<WindowGeometry>) -> Option<DevToolsReading> {
        let geometry = geometry.filter(WindowGeometry::is_measurable)?;
        let suspected = self.is_suspected(&geometry);
        self.score = if suspected {
            (self.score + 1).min(MAX_SCORE)
        } else {
            self.score.saturating_sub(1)
        };
        Some(DevToolsReading::from_score(self.score, suspected))
    }

    /// Sample and write the result into the monitor's record
    pub fn sample(
        &mut self,
        geometry: Option<WindowGeometry>,
        monitor: &BehaviorMonitor,
    ) -> Option<DevToolsReading> {
        let reading = self.step(geometry);
        match &reading {
            Some(r) => {
                log::trace!("devtools sample: score={} suspected={}", r.score, r.suspected);
                monitor.apply_devtools(r);
            }
            None => log::trace!("devtools sample skipped: window not measurable"),
        }
        reading
    }
}

/// Sample the host's window geometry on a fixed period for the life of the
/// returned task. The first sample is taken one period after spawning.
pub fn spawn_devtools_sampler(
    host: Arc<dyn Host>,
    monitor: BehaviorMonitor,
    config: DevToolsConfig,
) -> JoinHandle<()> {
    let period = config.sample_interval();
    let mut heuristic = DevToolsHeuristic::new(config);
    tokio::spawn(async move {
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            heuristic.sample(host.window_geometry(), &monitor);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::StaticHost;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn docked() -> Option<WindowGeometry> {
        Some(WindowGeometry::new(1920, 1080, 1920, 700))
    }

    fn clean() -> Option<WindowGeometry> {
        Some(WindowGeometry::new(1920, 1080, 1904, 960))
    }

    #[test]
    fn test_docked_panel_reaches_high_on_third_tick() {
        let mut heuristic = DevToolsHeuristic::default();
        let monitor = BehaviorMonitor::new(0);

        let seen: Vec<_> = (0..3)
            .map(|_| heuristic.sample(docked(), &monitor).unwrap())
            .map(|r| (r.confidence, r.open))
            .collect();
        assert_eq!(
            seen,
            vec![
                (DevtoolsConfidence::Low, false),
                (DevtoolsConfidence::Medium, false),
                (DevtoolsConfidence::High, true),
            ]
        );

        let record = monitor.snapshot();
        assert!(record.devtools_open);
        assert_eq!(record.devtools_confidence, DevtoolsConfidence::High);
    }

    #[test]
    fn test_threshold_scales_with_window() {
        let heuristic = DevToolsHeuristic::default();
        // 0.12 * 1080 = 129.6, below the base
        assert_eq!(heuristic.threshold(&WindowGeometry::new(1920, 1080, 1920, 1000)), 160);
        // 0.12 * 2160 = 259.2
        assert_eq!(heuristic.threshold(&WindowGeometry::new(3840, 2160, 3840, 2000)), 259);

        // a 200px gap is suspicious on 1080p but not on 4K
        assert!(heuristic.is_suspected(&WindowGeometry::new(1920, 1080, 1920, 880)));
        assert!(!heuristic.is_suspected(&WindowGeometry::new(3840, 2160, 3840, 1960)));
    }

    #[test]
    fn test_gap_must_exceed_threshold() {
        let heuristic = DevToolsHeuristic::default();
        assert!(!heuristic.is_suspected(&WindowGeometry::new(1920, 1080, 1920, 920)));
        assert!(heuristic.is_suspected(&WindowGeometry::new(1920, 1080, 1920, 919)));
        assert!(heuristic.is_suspected(&WindowGeometry::new(1920, 1080, 1500, 1000)));
    }

    #[test]
    fn test_small_viewport_never_suspected() {
        let mut heuristic = DevToolsHeuristic::default();
        let narrow = Some(WindowGeometry::new(1920, 1080, 600, 700));
        for _ in 0..10 {
            let reading = heuristic.step(narrow).unwrap();
            assert!(!reading.suspected);
            assert_eq!(reading.score, 0);
        }

        let short = WindowGeometry::new(1920, 1080, 1200, 450);
        assert!(heuristic.is_small_viewport(&short));
        assert!(!heuristic.is_suspected(&short));
    }

    #[test]
    fn test_small_viewport_only_decays_score() {
        let mut heuristic = DevToolsHeuristic::default();
        for _ in 0..5 {
            heuristic.step(docked());
        }
        assert_eq!(heuristic.score(), 5);

        let narrow = Some(WindowGeometry::new(1920, 1080, 600, 700));
        let scores: Vec<u8> = (0..6).map(|_| heuristic.step(narrow).unwrap().score).collect();
        assert_eq!(scores, vec![4, 3, 2, 1, 0, 0]);
    }

    #[test]
    fn test_score_stays_bounded() {
        let mut heuristic = DevToolsHeuristic::default();
        let pattern = [docked(), docked(), clean(), docked(), docked(), docked(), docked()];
        for geometry in pattern.iter().cycle().take(200) {
            let reading = heuristic.step(*geometry).unwrap();
            assert!(reading.score <= MAX_SCORE);
            assert_eq!(reading.open, reading.score >= OPEN_SCORE);
            assert_eq!(reading.confidence, DevtoolsConfidence::from_score(reading.score));
        }
    }

    #[test]
    fn test_hysteresis_on_close() {
        let mut heuristic = DevToolsHeuristic::default();
        let monitor = BehaviorMonitor::new(0);
        for _ in 0..8 {
            heuristic.sample(docked(), &monitor);
        }
        assert_eq!(heuristic.score(), MAX_SCORE);

        // 5 -> 4 -> 3 keeps the panel open; 2 clears it
        heuristic.sample(clean(), &monitor);
        heuristic.sample(clean(), &monitor);
        assert!(monitor.snapshot().devtools_open);
        heuristic.sample(clean(), &monitor);
        let record = monitor.snapshot();
        assert!(!record.devtools_open);
        assert_eq!(record.devtools_confidence, DevtoolsConfidence::Medium);
    }

    #[test]
    fn test_single_noisy_sample_does_not_open() {
        let mut heuristic = DevToolsHeuristic::default();
        for geometry in [clean(), docked(), clean(), docked(), clean()] {
            assert!(!heuristic.step(geometry).unwrap().open);
        }
    }

    #[test]
    fn test_unmeasurable_tick_is_skipped() {
        let mut heuristic = DevToolsHeuristic::default();
        let monitor = BehaviorMonitor::new(0);
        heuristic.sample(docked(), &monitor);
        heuristic.sample(docked(), &monitor);

        assert_eq!(heuristic.sample(None, &monitor), None);
        assert_eq!(
            heuristic.sample(Some(WindowGeometry::new(1920, 1080, 0, 700)), &monitor),
            None
        );
        assert_eq!(heuristic.score(), 2);
        assert_eq!(monitor.snapshot().devtools_confidence, DevtoolsConfidence::Medium);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sampler_ticks_once_per_second() {
        let host = StaticHost {
            geometry: docked(),
            ..Default::default()
        };
        let monitor = BehaviorMonitor::new(0);
        let sampler = spawn_devtools_sampler(
            Arc::new(host),
            monitor.clone(),
            DevToolsConfig::default(),
        );

        time::sleep(Duration::from_millis(500)).await;
        assert_eq!(monitor.snapshot().devtools_confidence, DevtoolsConfidence::None);

        time::sleep(Duration::from_millis(2000)).await;
        let record = monitor.snapshot();
        assert_eq!(record.devtools_confidence, DevtoolsConfidence::Medium);
        assert!(!record.devtools_open);

        time::sleep(Duration::from_millis(1000)).await;
        let record = monitor.snapshot();
        assert_eq!(record.devtools_confidence, DevtoolsConfidence::High);
        assert!(record.devtools_open);

        sampler.abort();
    }
}
