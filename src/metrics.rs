//! Per-frame data-collection metrics and the quality figures derived from
//! them.
//!
//! The dataset is produced upstream (processing pipeline → `metrics.json`)
//! and is read-only for the whole session. Everything the visualization needs
//! per frame is recomputed from these records on every frame change.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::XtalError;
use crate::util::ramp::{hex_rgb, Rgb};

/// Upper end of the r-merge gauge domain.
pub const R_MERGE_CEILING: f32 = 0.3;

/// Reference I/σ around which the per-frame heuristics pivot.
const PIVOT_I_OVER_SIGMA: f32 = 25.0;

/// Floor applied to the per-frame CC½ estimate.
const CC_HALF_FLOOR: f32 = 0.95;

/// Statistics for one resolution shell of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolutionShell {
    /// Shell resolution in Å (smaller is higher resolution).
    pub resolution: f32,
    /// Signal-to-noise ratio of the shell's intensities.
    pub i_over_sigma: f32,
    /// Percentage of observable reflections measured, `0..=100`.
    pub completeness: f32,
    /// Number of reflections in the shell.
    pub n_reflections: u32,
}

/// Metrics for a single acquisition frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameMetrics {
    /// 1-based frame number.
    pub frame: u32,
    /// Shells in increasing resolution-index order.
    #[serde(rename = "resolution_shells", default)]
    pub shells: Vec<ResolutionShell>,
    /// Frame-wide I/σ.
    #[serde(default)]
    pub overall_i_over_sigma: f32,
    /// Frame-wide completeness percentage.
    #[serde(default)]
    pub overall_completeness: f32,
}

/// Scalar to plot for a frame in a time-series chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKey {
    /// [`FrameMetrics::overall_i_over_sigma`].
    OverallIOverSigma,
    /// [`FrameMetrics::overall_completeness`].
    OverallCompleteness,
}

impl MetricKey {
    /// Read this metric from a frame. Non-finite values read as zero.
    #[must_use]
    pub fn value(self, frame: &FrameMetrics) -> f32 {
        let v = match self {
            Self::OverallIOverSigma => frame.overall_i_over_sigma,
            Self::OverallCompleteness => frame.overall_completeness,
        };
        if v.is_finite() {
            v
        } else {
            0.0
        }
    }

    /// Unit suffix used in axis labels.
    #[must_use]
    pub fn unit(self) -> &'static str {
        match self {
            Self::OverallIOverSigma => "",
            Self::OverallCompleteness => "%",
        }
    }
}

/// Dataset-level statistics computed upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    /// High-resolution limit in Å.
    pub resolution: f32,
    /// Space group label, e.g. `P43212`.
    pub space_group: String,
    /// Unit cell label.
    pub unit_cell: String,
    /// Overall completeness percentage.
    pub completeness: f32,
    /// Overall I/σ.
    pub i_over_sigma: f32,
    /// Overall r-merge.
    pub r_merge: f32,
    /// Overall CC½.
    pub cc_half: f32,
    /// Mosaicity in degrees.
    pub mosaicity: f32,
}

/// The full, immutable metrics dataset for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsDataset {
    /// Dataset identifier.
    #[serde(default)]
    pub dataset: String,
    /// Number of frames in the collection.
    pub total_frames: u32,
    /// Frames ordered by frame number.
    pub frames: Vec<FrameMetrics>,
    /// Dataset-level statistics.
    pub overall_statistics: AggregateStats,
}

impl MetricsDataset {
    /// Decode a dataset from its JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, XtalError> {
        let dataset: Self = serde_json::from_str(json)?;
        log::debug!(
            "decoded metrics for {:?}: {} frames",
            dataset.dataset,
            dataset.frames.len()
        );
        Ok(dataset)
    }

    /// Load a dataset from a `metrics.json` file.
    pub fn load(path: &Path) -> Result<Self, XtalError> {
        let content = std::fs::read_to_string(path)?;
        let dataset = Self::from_json_str(&content)?;
        log::info!(
            "loaded {} ({} frames)",
            path.display(),
            dataset.frames.len()
        );
        Ok(dataset)
    }

    /// Number of frames actually present (may differ from `total_frames`).
    #[must_use]
    pub fn frame_count(&self) -> u32 {
        self.frames.len() as u32
    }

    /// The frame with 1-based number `frame`, if present.
    #[must_use]
    pub fn frame(&self, frame: u32) -> Option<&FrameMetrics> {
        let idx = usize::try_from(frame).ok()?.checked_sub(1)?;
        self.frames.get(idx)
    }

    /// Frames `1..=current`, never including frames after `current`.
    #[must_use]
    pub fn history(&self, current: u32) -> &[FrameMetrics] {
        let end = (current as usize).min(self.frames.len());
        &self.frames[..end]
    }
}

/// Averages over the shells of one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShellSummary {
    /// Mean shell I/σ.
    pub avg_i_over_sigma: f32,
    /// Mean shell completeness.
    pub avg_completeness: f32,
    /// Sum of reflections over all shells.
    pub total_reflections: u64,
    /// Best (smallest) resolution in Å.
    pub best_resolution: f32,
}

impl ShellSummary {
    /// Summarise a shell list. `None` when there are no shells.
    #[must_use]
    pub fn from_shells(shells: &[ResolutionShell]) -> Option<Self> {
        if shells.is_empty() {
            return None;
        }
        let n = shells.len() as f32;
        let avg_i_over_sigma =
            shells.iter().map(|s| s.i_over_sigma).sum::<f32>() / n;
        let avg_completeness =
            shells.iter().map(|s| s.completeness).sum::<f32>() / n;
        let total_reflections =
            shells.iter().map(|s| u64::from(s.n_reflections)).sum();
        let best_resolution = shells
            .iter()
            .map(|s| s.resolution)
            .fold(f32::INFINITY, f32::min);
        Some(Self {
            avg_i_over_sigma,
            avg_completeness,
            total_reflections,
            best_resolution,
        })
    }

    /// Average I/σ normalised against 30 and capped at 1.
    #[must_use]
    pub fn intensity_normalized(&self) -> f32 {
        (self.avg_i_over_sigma / 30.0).clamp(0.0, 1.0)
    }

    /// Average completeness as a fraction in `[0, 1]`.
    #[must_use]
    pub fn completeness_normalized(&self) -> f32 {
        (self.avg_completeness / 100.0).clamp(0.0, 1.0)
    }
}

/// Quality band of a frame's average shell I/σ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityBand {
    /// No shells to judge.
    NoData,
    /// Below 10.
    Critical,
    /// 10 to 15.
    Poor,
    /// 15 to 20.
    Fair,
    /// 20 to 25.
    Good,
    /// 25 and above.
    Excellent,
}

impl QualityBand {
    /// Classify an optional summary.
    #[must_use]
    pub fn of(summary: Option<&ShellSummary>) -> Self {
        let Some(summary) = summary else {
            return Self::NoData;
        };
        let avg = summary.avg_i_over_sigma;
        if avg < 10.0 {
            Self::Critical
        } else if avg < 15.0 {
            Self::Poor
        } else if avg < 20.0 {
            Self::Fair
        } else if avg < 25.0 {
            Self::Good
        } else {
            Self::Excellent
        }
    }

    /// Display label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::NoData => "NO DATA",
            Self::Critical => "CRITICAL",
            Self::Poor => "POOR",
            Self::Fair => "FAIR",
            Self::Good => "GOOD",
            Self::Excellent => "EXCELLENT",
        }
    }

    /// Accent colour; dimmed grey when there is no data.
    #[must_use]
    pub fn color(self) -> Rgb {
        hex_rgb(match self {
            Self::NoData => 0x66_6666,
            Self::Critical => 0xff_0033,
            Self::Poor => 0xff_6600,
            Self::Fair => 0xff_cc00,
            Self::Good => 0x00_ffff,
            Self::Excellent => 0x00_66ff,
        })
    }
}

/// Label + colour pair for a quality card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grade {
    /// Status text.
    pub label: &'static str,
    /// Accent colour.
    pub color: Rgb,
}

const EXCELLENT_GREEN: u32 = 0x00_ff88;
const GOOD_CYAN: u32 = 0x00_d9ff;
const ACCEPTABLE_AMBER: u32 = 0xff_aa00;
const POOR_ORANGE: u32 = 0xff_6600;
const CRITICAL_RED: u32 = 0xff_0033;

impl Grade {
    fn new(label: &'static str, hex: u32) -> Self {
        Self {
            label,
            color: hex_rgb(hex),
        }
    }

    /// CC½ card: `>0.995` excellent, `>0.99` good, `>0.95` acceptable.
    #[must_use]
    pub fn cc_half(cc_half: f32) -> Self {
        if cc_half > 0.995 {
            Self::new("EXCELLENT", EXCELLENT_GREEN)
        } else if cc_half > 0.99 {
            Self::new("GOOD", GOOD_CYAN)
        } else if cc_half > 0.95 {
            Self::new("ACCEPTABLE", ACCEPTABLE_AMBER)
        } else {
            Self::new("POOR", POOR_ORANGE)
        }
    }

    /// Mosaicity card: `<0.2` excellent, `<0.5` good, `<1.0` acceptable.
    #[must_use]
    pub fn mosaicity(mosaicity: f32) -> Self {
        if mosaicity < 0.2 {
            Self::new("EXCELLENT", EXCELLENT_GREEN)
        } else if mosaicity < 0.5 {
            Self::new("GOOD", GOOD_CYAN)
        } else if mosaicity < 1.0 {
            Self::new("ACCEPTABLE", ACCEPTABLE_AMBER)
        } else {
            Self::new("POOR", POOR_ORANGE)
        }
    }

    /// Current-frame I/σ card.
    #[must_use]
    pub fn frame_i_over_sigma(i_over_sigma: f32) -> Self {
        let hex = if i_over_sigma > 15.0 {
            EXCELLENT_GREEN
        } else {
            POOR_ORANGE
        };
        let label = if i_over_sigma > 20.0 {
            "EXCELLENT"
        } else if i_over_sigma > 15.0 {
            "GOOD"
        } else {
            "POOR"
        };
        Self::new(label, hex)
    }

    /// Current-frame completeness card.
    #[must_use]
    pub fn frame_completeness(completeness: f32) -> Self {
        let hex = if completeness > 90.0 {
            EXCELLENT_GREEN
        } else {
            POOR_ORANGE
        };
        let label = if completeness > 95.0 {
            "EXCELLENT"
        } else if completeness > 90.0 {
            "GOOD"
        } else {
            "FAIR"
        };
        Self::new(label, hex)
    }
}

/// R-merge bucket on the gauge. Lower r-merge is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RMergeBand {
    /// `< 0.05`
    Excellent,
    /// `0.05 ..< 0.10`
    Good,
    /// `0.10 ..< 0.15`
    Acceptable,
    /// `0.15 ..< 0.25`
    Poor,
    /// `>= 0.25`
    Critical,
}

impl RMergeBand {
    /// Upper segment bounds in ascending order, ending at the ceiling.
    pub const SEGMENT_ENDS: [f32; 5] = [0.05, 0.10, 0.15, 0.25, 0.30];

    /// All bands in gauge order.
    pub const ALL: [Self; 5] = [
        Self::Excellent,
        Self::Good,
        Self::Acceptable,
        Self::Poor,
        Self::Critical,
    ];

    /// Classify an r-merge value (closed-open buckets).
    #[must_use]
    pub fn of(r_merge: f32) -> Self {
        if r_merge < 0.05 {
            Self::Excellent
        } else if r_merge < 0.10 {
            Self::Good
        } else if r_merge < 0.15 {
            Self::Acceptable
        } else if r_merge < 0.25 {
            Self::Poor
        } else {
            Self::Critical
        }
    }

    /// Label + colour for this band.
    #[must_use]
    pub fn grade(self) -> Grade {
        match self {
            Self::Excellent => Grade::new("EXCELLENT", EXCELLENT_GREEN),
            Self::Good => Grade::new("GOOD", GOOD_CYAN),
            Self::Acceptable => Grade::new("ACCEPTABLE", ACCEPTABLE_AMBER),
            Self::Poor => Grade::new("POOR", POOR_ORANGE),
            Self::Critical => Grade::new("CRITICAL", CRITICAL_RED),
        }
    }
}

/// Per-frame quality estimates shown on the gauge.
///
/// These are heuristic extrapolations of the aggregate statistics from a
/// single frame's I/σ, not crystallographic derivations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameQuality {
    /// `overall_r_merge * 25 / frame_i_over_sigma`.
    pub r_merge: f32,
    /// `max(0.95, overall_cc_half - (25 - frame_i_over_sigma) * 0.002)`.
    pub cc_half: f32,
    /// `overall_mosaicity * (1 + (25 - frame_i_over_sigma) * 0.01)`.
    pub mosaicity: f32,
}

impl FrameQuality {
    /// Derive the estimates for `frame`, falling back to the aggregate
    /// values when no frame is available.
    #[must_use]
    pub fn derive(stats: &AggregateStats, frame: Option<&FrameMetrics>) -> Self {
        let Some(frame) = frame else {
            return Self {
                r_merge: stats.r_merge,
                cc_half: stats.cc_half,
                mosaicity: stats.mosaicity,
            };
        };
        let ios = frame.overall_i_over_sigma;

        let r_merge = if ios.is_finite() && ios > 0.0 {
            stats.r_merge * (PIVOT_I_OVER_SIGMA / ios)
        } else {
            // limit of the formula as I/σ → 0 is off the top of the gauge
            R_MERGE_CEILING
        };
        let deficit = if ios.is_finite() {
            PIVOT_I_OVER_SIGMA - ios
        } else {
            0.0
        };
        let cc_half = (stats.cc_half - deficit * 0.002).max(CC_HALF_FLOOR);
        let mosaicity = stats.mosaicity * (1.0 + deficit * 0.01);

        Self {
            r_merge,
            cc_half,
            mosaicity,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn shell(
        resolution: f32,
        i_over_sigma: f32,
        completeness: f32,
        n_reflections: u32,
    ) -> ResolutionShell {
        ResolutionShell {
            resolution,
            i_over_sigma,
            completeness,
            n_reflections,
        }
    }

    pub(crate) fn stats() -> AggregateStats {
        AggregateStats {
            resolution: 1.5,
            space_group: "P43212".to_owned(),
            unit_cell: "79.1 79.1 38.0 90 90 90".to_owned(),
            completeness: 99.2,
            i_over_sigma: 25.0,
            r_merge: 0.08,
            cc_half: 0.998,
            mosaicity: 0.3,
        }
    }

    pub(crate) fn frame(n: u32, ios: f32, completeness: f32) -> FrameMetrics {
        FrameMetrics {
            frame: n,
            shells: vec![
                shell(8.0, ios * 1.4, completeness, 1200),
                shell(4.0, ios, completeness, 2400),
                shell(2.0, ios * 0.5, completeness * 0.9, 9600),
            ],
            overall_i_over_sigma: ios,
            overall_completeness: completeness,
        }
    }

    const SAMPLE: &str = r#"{
        "dataset": "lysozyme_good",
        "total_frames": 2,
        "frames": [
            {
                "frame": 1,
                "resolution_shells": [
                    {"resolution": 8.0, "i_over_sigma": 30.5, "completeness": 99.0, "n_reflections": 1500}
                ],
                "overall_i_over_sigma": 22.0,
                "overall_completeness": 91.0
            },
            {
                "frame": 2,
                "resolution_shells": [],
                "overall_i_over_sigma": 21.0,
                "overall_completeness": 93.5
            }
        ],
        "overall_statistics": {
            "resolution": 1.5,
            "space_group": "P43212",
            "unit_cell": "79.1 79.1 38.0",
            "completeness": 99.2,
            "i_over_sigma": 25.0,
            "r_merge": 0.08,
            "cc_half": 0.998,
            "mosaicity": 0.3
        }
    }"#;

    #[test]
    fn decodes_upstream_layout() {
        let ds = MetricsDataset::from_json_str(SAMPLE).unwrap();
        assert_eq!(ds.total_frames, 2);
        assert_eq!(ds.frames[0].shells.len(), 1);
        assert_eq!(ds.frames[0].shells[0].n_reflections, 1500);
        assert_eq!(ds.overall_statistics.space_group, "P43212");
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = MetricsDataset::from_json_str("{\"frames\": 3}").unwrap_err();
        assert!(matches!(err, XtalError::MetricsParse(_)));
    }

    #[test]
    fn frame_lookup_is_one_based() {
        let ds = MetricsDataset::from_json_str(SAMPLE).unwrap();
        assert!(ds.frame(0).is_none());
        assert_eq!(ds.frame(1).map(|f| f.frame), Some(1));
        assert_eq!(ds.frame(2).map(|f| f.frame), Some(2));
        assert!(ds.frame(3).is_none());
    }

    #[test]
    fn history_never_includes_future_frames() {
        let ds = MetricsDataset::from_json_str(SAMPLE).unwrap();
        assert!(ds.history(0).is_empty());
        assert_eq!(ds.history(1).len(), 1);
        assert_eq!(ds.history(99).len(), 2);
    }

    #[test]
    fn summary_of_empty_shells_is_none() {
        assert!(ShellSummary::from_shells(&[]).is_none());
        assert_eq!(QualityBand::of(None).label(), "NO DATA");
        assert_eq!(QualityBand::of(None).color(), hex_rgb(0x666666));
    }

    #[test]
    fn summary_averages_shells() {
        let shells = [shell(4.0, 10.0, 90.0, 100), shell(2.0, 20.0, 100.0, 50)];
        let s = ShellSummary::from_shells(&shells).unwrap();
        assert_eq!(s.avg_i_over_sigma, 15.0);
        assert_eq!(s.avg_completeness, 95.0);
        assert_eq!(s.total_reflections, 150);
        assert_eq!(s.best_resolution, 2.0);
        assert_eq!(QualityBand::of(Some(&s)), QualityBand::Fair);
    }

    #[test]
    fn frame_r_merge_matches_the_heuristic() {
        let f = frame(1, 20.0, 95.0);
        let q = FrameQuality::derive(&stats(), Some(&f));
        assert!((q.r_merge - 0.10).abs() < 1e-6);
        assert!((q.cc_half - (0.998 - 5.0 * 0.002)).abs() < 1e-6);
        assert!((q.mosaicity - 0.3 * 1.05).abs() < 1e-6);
    }

    #[test]
    fn frame_cc_half_is_floored() {
        // 0.998 - 25 * 0.002 lands below the floor
        let f = frame(1, 0.0, 50.0);
        let q = FrameQuality::derive(&stats(), Some(&f));
        assert_eq!(q.cc_half, CC_HALF_FLOOR);
        let f = frame(1, -10.0, 50.0);
        assert_eq!(FrameQuality::derive(&stats(), Some(&f)).cc_half, CC_HALF_FLOOR);
    }

    #[test]
    fn zero_i_over_sigma_saturates_instead_of_dividing() {
        let f = frame(1, 0.0, 50.0);
        let q = FrameQuality::derive(&stats(), Some(&f));
        assert_eq!(q.r_merge, R_MERGE_CEILING);
        assert!(q.cc_half.is_finite());
        assert!(q.mosaicity.is_finite());
    }

    #[test]
    fn missing_frame_falls_back_to_aggregates() {
        let q = FrameQuality::derive(&stats(), None);
        assert_eq!(q.r_merge, 0.08);
        assert_eq!(q.cc_half, 0.998);
        assert_eq!(q.mosaicity, 0.3);
    }

    #[test]
    fn r_merge_buckets_are_closed_open() {
        assert_eq!(RMergeBand::of(0.0499), RMergeBand::Excellent);
        assert_eq!(RMergeBand::of(0.05), RMergeBand::Good);
        assert_eq!(RMergeBand::of(0.10), RMergeBand::Acceptable);
        assert_eq!(RMergeBand::of(0.15), RMergeBand::Poor);
        assert_eq!(RMergeBand::of(0.25), RMergeBand::Critical);
        assert_eq!(RMergeBand::of(0.3), RMergeBand::Critical);
        assert_eq!(RMergeBand::of(0.05).grade().label, "GOOD");
    }

    #[test]
    fn card_grades() {
        assert_eq!(Grade::cc_half(0.999).label, "EXCELLENT");
        assert_eq!(Grade::cc_half(0.995).label, "GOOD");
        assert_eq!(Grade::cc_half(0.96).label, "ACCEPTABLE");
        assert_eq!(Grade::cc_half(0.95).label, "POOR");
        assert_eq!(Grade::mosaicity(0.1).label, "EXCELLENT");
        assert_eq!(Grade::mosaicity(0.2).label, "GOOD");
        assert_eq!(Grade::mosaicity(0.99).label, "ACCEPTABLE");
        assert_eq!(Grade::mosaicity(1.0).label, "POOR");
        assert_eq!(Grade::frame_i_over_sigma(21.0).label, "EXCELLENT");
        assert_eq!(Grade::frame_i_over_sigma(16.0).label, "GOOD");
        assert_eq!(Grade::frame_completeness(92.0).label, "GOOD");
        assert_eq!(Grade::frame_completeness(90.0).label, "FAIR");
    }

    #[test]
    fn metric_key_reads_and_sanitises() {
        let mut f = frame(3, 18.0, 97.0);
        assert_eq!(MetricKey::OverallIOverSigma.value(&f), 18.0);
        assert_eq!(MetricKey::OverallCompleteness.unit(), "%");
        f.overall_completeness = f32::NAN;
        assert_eq!(MetricKey::OverallCompleteness.value(&f), 0.0);
    }
}
