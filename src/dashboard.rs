//! Composition of every panel around one metrics dataset.
//!
//! [`Dashboard`] is what the frame loop drives: a frame change recomputes
//! the per-frame quality estimates, the shell chart and the 3D scene; every
//! tick advances the scene and redraws the animated 2D panels, including
//! the resolution rings under the current image pan and zoom.

use glam::Vec2;
use rand::Rng;

use crate::chart::gauge::{self, FrameReadings, GaugeReadout};
use crate::chart::{rings, shells, timeseries, DisplayList, SeriesStyle};
use crate::ice::IceAnalysis;
use crate::metrics::{FrameQuality, MetricKey, MetricsDataset, QualityBand, ResolutionShell};
use crate::options::Options;
use crate::scene::SceneAnimator;
use crate::scheduler::{FrameClock, FrameHooks};
use crate::util::ramp::hex_rgb;
use crate::viewport::Viewport;

/// Data-driven input: the current frame and its shells.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameInput {
    /// 1-based frame number.
    pub frame: u32,
    /// Shells of that frame; empty when the frame has none.
    pub shells: Vec<ResolutionShell>,
}

/// The rendered 2D panels.
#[derive(Debug, Clone, PartialEq)]
pub struct Panels {
    /// I/σ time series.
    pub i_over_sigma: DisplayList,
    /// Completeness time series.
    pub completeness: DisplayList,
    /// Per-shell bar chart of the current frame.
    pub shells: DisplayList,
    /// Gauge; absent when the current frame has no metrics.
    pub gauge: Option<GaugeReadout>,
    /// Resolution rings over the diffraction image.
    pub rings: DisplayList,
}

/// Every panel of the session.
#[derive(Debug)]
pub struct Dashboard<R: Rng> {
    dataset: MetricsDataset,
    options: Options,
    scene: SceneAnimator,
    rng: R,
    current_frame: u32,
    quality: Option<FrameQuality>,
    shells: Vec<ResolutionShell>,
    viewport: Viewport,
    /// Playing flag and time of the latest tick.
    ring_phase: (bool, f32),
    panels: Panels,
    ice: Option<IceAnalysis>,
    i_over_sigma_style: SeriesStyle,
    completeness_style: SeriesStyle,
}

impl<R: Rng> Dashboard<R> {
    /// Build the dashboard with a `width` × `height` 3D view. No frame is
    /// selected until the first data change.
    pub fn new(dataset: MetricsDataset, options: Options, width: u32, height: u32, rng: R) -> Self {
        let scene = SceneAnimator::create(&options, width, height);
        let i_over_sigma_style = SeriesStyle {
            metric: MetricKey::OverallIOverSigma,
            label: "I/σ(I) Signal Quality".to_owned(),
            color: hex_rgb(0x00_d9ff),
            threshold: Some(options.display.i_over_sigma_threshold),
        };
        let completeness_style = SeriesStyle {
            metric: MetricKey::OverallCompleteness,
            label: "Data Completeness".to_owned(),
            color: hex_rgb(0x00_ff88),
            threshold: Some(options.display.completeness_threshold),
        };
        let chart = chart_size(options.display.chart_size);
        let viewport = Viewport::new();
        let panels = Panels {
            i_over_sigma: timeseries::render(&[], 0, &i_over_sigma_style, chart, 0.0),
            completeness: timeseries::render(&[], 0, &completeness_style, chart, 0.0),
            shells: shells::render(&[], chart_size(options.display.shell_chart_size)),
            gauge: None,
            rings: rings::render(
                &[],
                &viewport,
                false,
                0.0,
                options.display.ring_overlay_size as f32,
            ),
        };
        Self {
            dataset,
            options,
            scene,
            rng,
            current_frame: 0,
            quality: None,
            shells: Vec::new(),
            viewport,
            ring_phase: (false, 0.0),
            panels,
            ice: None,
            i_over_sigma_style,
            completeness_style,
        }
    }

    /// Input for `frame`: its shells, or none when the frame is missing.
    #[must_use]
    pub fn input_for(&self, frame: u32) -> FrameInput {
        FrameInput {
            frame,
            shells: self
                .dataset
                .frame(frame)
                .map(|f| f.shells.clone())
                .unwrap_or_default(),
        }
    }

    /// The dataset.
    #[must_use]
    pub fn dataset(&self) -> &MetricsDataset {
        &self.dataset
    }

    /// The 3D scene.
    #[must_use]
    pub fn scene(&self) -> &SceneAnimator {
        &self.scene
    }

    /// The 3D scene, mutably.
    pub fn scene_mut(&mut self) -> &mut SceneAnimator {
        &mut self.scene
    }

    /// Latest 2D panels.
    #[must_use]
    pub fn panels(&self) -> &Panels {
        &self.panels
    }

    /// Frame shown, `0` before the first data change.
    #[must_use]
    pub fn current_frame(&self) -> u32 {
        self.current_frame
    }

    /// Per-frame quality estimates for the current frame.
    #[must_use]
    pub fn quality(&self) -> Option<FrameQuality> {
        self.quality
    }

    /// Quality band of the current shells.
    #[must_use]
    pub fn quality_band(&self) -> QualityBand {
        QualityBand::of(self.scene.state().summary.as_ref())
    }

    /// Pan and zoom of the diffraction image. Redraws the ring overlay.
    pub fn set_viewport(&mut self, viewport: &Viewport) {
        self.viewport = *viewport;
        self.redraw_rings();
    }

    /// Record an ice-analysis result (or its fallback).
    pub fn set_ice(&mut self, analysis: IceAnalysis) {
        if analysis.ice_detected {
            log::info!(
                "frame {}: {} ({} rings)",
                self.current_frame,
                analysis.status,
                analysis.ring_count
            );
        }
        self.ice = Some(analysis);
    }

    /// Latest ice-analysis result.
    #[must_use]
    pub fn ice(&self) -> Option<&IceAnalysis> {
        self.ice.as_ref()
    }

    fn redraw_gauge(&mut self) {
        let frame = self.dataset.frame(self.current_frame);
        self.panels.gauge = match (self.quality, frame) {
            (Some(q), Some(f)) => Some(gauge::render(
                q.r_merge,
                q.cc_half,
                q.mosaicity,
                FrameReadings {
                    i_over_sigma: Some(f.overall_i_over_sigma),
                    completeness: Some(f.overall_completeness),
                },
                self.options.display.gauge_size as f32,
            )),
            _ => None,
        };
    }

    fn redraw_rings(&mut self) {
        let (playing, time) = self.ring_phase;
        self.panels.rings = rings::render(
            &self.shells,
            &self.viewport,
            playing,
            time,
            self.options.display.ring_overlay_size as f32,
        );
    }

    fn redraw_series(&mut self, time: f32) {
        let history = self.dataset.history(self.current_frame);
        let size = chart_size(self.options.display.chart_size);
        self.panels.i_over_sigma =
            timeseries::render(history, self.current_frame, &self.i_over_sigma_style, size, time);
        self.panels.completeness =
            timeseries::render(history, self.current_frame, &self.completeness_style, size, time);
    }
}

impl<R: Rng> FrameHooks for Dashboard<R> {
    type Input = FrameInput;

    fn tick(&mut self, clock: &FrameClock) {
        self.scene.tick(clock);
        self.redraw_series(clock.time);
        self.ring_phase = (clock.playing, clock.time);
        self.redraw_rings();
        self.redraw_gauge();
    }

    fn on_data_change(&mut self, input: &FrameInput) {
        self.current_frame = input.frame;
        let frame = self.dataset.frame(input.frame);
        self.quality =
            frame.map(|f| FrameQuality::derive(&self.dataset.overall_statistics, Some(f)));
        self.scene.update(&input.shells, &mut self.rng);
        self.shells.clone_from(&input.shells);
        self.redraw_rings();
        self.panels.shells = shells::render(
            &input.shells,
            chart_size(self.options.display.shell_chart_size),
        );
        self.redraw_gauge();
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        self.scene.resize(width, height);
    }
}

fn chart_size([w, h]: [u32; 2]) -> Vec2 {
    Vec2::new(w as f32, h as f32)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::chart::DrawCmd;
    use crate::metrics::tests::{frame, stats};

    fn dashboard() -> Dashboard<StdRng> {
        let dataset = MetricsDataset {
            dataset: "lysozyme".to_owned(),
            total_frames: 4,
            frames: (1..=4).map(|n| frame(n, 18.0 + n as f32, 90.0 + n as f32)).collect(),
            overall_statistics: stats(),
        };
        Dashboard::new(dataset, Options::default(), 800, 600, StdRng::seed_from_u64(9))
    }

    #[test]
    fn starts_without_data() {
        let d = dashboard();
        assert!(d.panels().gauge.is_none());
        assert!(d.panels().shells.has_text("NO DATA"));
        assert_eq!(d.quality_band(), QualityBand::NoData);
    }

    #[test]
    fn frame_change_rebuilds_everything() {
        let mut d = dashboard();
        let input = d.input_for(2);
        d.on_data_change(&input);
        assert_eq!(d.current_frame(), 2);
        assert_eq!(d.scene().state().clouds.len(), 3);
        let q = d.quality().unwrap();
        assert!((q.r_merge - 0.08 * 25.0 / 20.0).abs() < 1e-6);
        let gauge = d.panels().gauge.as_ref().unwrap();
        assert_eq!(gauge.cards.len(), 4);
        assert!(d.panels().shells.has_text("4Å"));
    }

    #[test]
    fn tick_redraws_history_up_to_the_current_frame() {
        let mut d = dashboard();
        let input = d.input_for(3);
        d.on_data_change(&input);
        d.tick(&FrameClock {
            time: 1.0,
            dt: 0.016,
            playing: true,
        });
        assert!(d.panels().i_over_sigma.has_text("I/σ(I) Signal Quality"));
        assert!(!d.panels().completeness.has_text("NO DATA"));
    }

    #[test]
    fn missing_frame_falls_back_to_no_data() {
        let mut d = dashboard();
        let input = d.input_for(1);
        d.on_data_change(&input);
        let input = d.input_for(40);
        assert!(input.shells.is_empty());
        d.on_data_change(&input);
        assert!(d.scene().state().clouds.is_empty());
        assert!(d.panels().gauge.is_none());
        assert_eq!(d.quality_band(), QualityBand::NoData);
    }

    #[test]
    fn rings_follow_the_viewport() {
        let mut d = dashboard();
        let input = d.input_for(2);
        d.on_data_change(&input);
        assert_eq!(d.panels().rings.texts().count(), 6);
        d.tick(&FrameClock {
            time: 0.5,
            dt: 0.016,
            playing: false,
        });
        let mut vp = Viewport::new();
        let _ = vp.set_zoom(1.0);
        d.set_viewport(&vp);
        let rings = &d.panels().rings;
        assert!(rings.has_text("8Å"));
        assert!(rings.has_text("I/σ: 20.0"));
        let radii: Vec<f32> = rings
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCmd::StrokeCircle { radius, .. } => Some(*radius),
                _ => None,
            })
            .collect();
        assert_eq!(radii, vec![120.0, 220.0, 520.0]);
    }

    #[test]
    fn frame_changes_without_a_renderer_keep_no_release_backlog() {
        let mut d = dashboard();
        for i in 0..2000 {
            let input = d.input_for(1 + i % 2);
            d.on_data_change(&input);
        }
        let pool = &d.scene().state().pool;
        assert!(!pool.is_mirrored());
        assert_eq!(pool.pending_release_count(), 0);
        assert!(pool.acquired_total() > 2000);
    }

    #[test]
    fn mirrored_release_backlog_stays_bounded() {
        let mut d = dashboard();
        d.scene_mut().pool_mut().attach_mirror();
        let input = d.input_for(1);
        d.on_data_change(&input);
        let _ = d.scene_mut().pool_mut().drain_released();
        for i in 0..1000 {
            let input = d.input_for(2 - i % 2);
            d.on_data_change(&input);
            // three clouds, each a geometry and a material
            assert_eq!(d.scene().state().pool.pending_release_count(), 6);
            assert_eq!(d.scene_mut().pool_mut().drain_released().len(), 6);
        }
    }

    #[test]
    fn ice_record_is_kept() {
        let mut d = dashboard();
        d.set_ice(IceAnalysis::from_fetch::<&str>(Err("connection refused")));
        assert!(d.ice().unwrap().is_fallback());
    }
}
