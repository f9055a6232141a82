//! 270° r-merge gauge with CC½ and mosaicity cards.
//!
//! The dial runs clockwise from `0.75π` to `2.25π` over `[0, 0.3]`. Angles
//! are in screen space (y down), so `0.75π` is lower-left and the sweep
//! passes over the top.

use std::f32::consts::PI;

use glam::Vec2;

use super::canvas::{rgba, DisplayList, Paint, Stroke, TextAlign, TextRun};
use crate::metrics::{Grade, RMergeBand, R_MERGE_CEILING};
use crate::util::ramp::{with_alpha, Rgb};

/// Dial start angle.
pub const START_ANGLE: f32 = PI * 0.75;
/// Dial end angle.
pub const END_ANGLE: f32 = PI * 2.25;
/// Dial radius.
pub const RADIUS: f32 = 150.0;
/// Needle inner end, measured from the centre.
pub const NEEDLE_INNER: f32 = 40.0;
/// Needle outer end, measured from the centre.
pub const NEEDLE_OUTER: f32 = 150.0;
/// Values that get a tick and a label.
pub const TICKS: [f32; 7] = [0.0, 0.05, 0.10, 0.15, 0.20, 0.25, 0.30];

const ACCENT: u32 = 0x00_d9ff;

/// One coloured band of the dial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaugeSegment {
    /// Upper value bound (exclusive except for the last).
    pub end: f32,
    /// Band label.
    pub label: &'static str,
    /// Band colour.
    pub color: Rgb,
}

/// A value and the ordered segments it is read against.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeInput {
    /// Needle value.
    pub value: f32,
    /// Segments in ascending `end` order; the last `end` is the dial maximum.
    pub segments: Vec<GaugeSegment>,
}

impl GaugeInput {
    /// The r-merge dial for `value`.
    #[must_use]
    pub fn r_merge(value: f32) -> Self {
        let segments = RMergeBand::ALL
            .iter()
            .zip(RMergeBand::SEGMENT_ENDS)
            .map(|(band, end)| {
                let grade = band.grade();
                GaugeSegment {
                    end,
                    label: grade.label,
                    color: grade.color,
                }
            })
            .collect();
        Self { value, segments }
    }

    /// Dial maximum.
    #[must_use]
    pub fn ceiling(&self) -> f32 {
        self.segments.last().map_or(R_MERGE_CEILING, |s| s.end)
    }

    /// Fraction of the sweep covered by the value, in `[0, 1]`.
    #[must_use]
    pub fn fraction(&self) -> f32 {
        fraction_of(self.value, self.ceiling())
    }

    /// Segment containing the value (closed-open), saturating to the last.
    #[must_use]
    pub fn active_segment(&self) -> Option<&GaugeSegment> {
        self.segments
            .iter()
            .find(|s| self.value < s.end)
            .or_else(|| self.segments.last())
    }
}

fn fraction_of(value: f32, ceiling: f32) -> f32 {
    if ceiling <= 0.0 || value.is_nan() {
        return 0.0;
    }
    (value / ceiling).clamp(0.0, 1.0)
}

/// Angle of `value` on a dial whose maximum is `ceiling`.
#[must_use]
pub fn angle_for(value: f32, ceiling: f32) -> f32 {
    START_ANGLE + fraction_of(value, ceiling) * (END_ANGLE - START_ANGLE)
}

/// A labelled quality card next to the dial.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityCard {
    /// Card heading.
    pub title: &'static str,
    /// Formatted value.
    pub value: String,
    /// Classification.
    pub grade: Grade,
}

/// Current-frame readings shown as extra cards when available.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameReadings {
    /// Current frame I/σ.
    pub i_over_sigma: Option<f32>,
    /// Current frame completeness.
    pub completeness: Option<f32>,
}

/// Everything the gauge shows.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeReadout {
    /// Dial drawing.
    pub dial: DisplayList,
    /// r-merge bucket.
    pub r_merge: RMergeBand,
    /// CC½ classification.
    pub cc_half: Grade,
    /// Mosaicity classification.
    pub mosaicity: Grade,
    /// Cards in display order.
    pub cards: Vec<QualityCard>,
}

/// Legend rows, one per segment.
#[must_use]
pub fn legend() -> [(&'static str, Rgb); 5] {
    let row = |band: RMergeBand| band.grade().color;
    [
        ("< 0.05 EXCELLENT", row(RMergeBand::Excellent)),
        ("0.05-0.10 GOOD", row(RMergeBand::Good)),
        ("0.10-0.15 ACCEPTABLE", row(RMergeBand::Acceptable)),
        ("0.15-0.25 POOR", row(RMergeBand::Poor)),
        ("> 0.25 CRITICAL", row(RMergeBand::Critical)),
    ]
}

fn polar(center: Vec2, angle: f32, r: f32) -> Vec2 {
    center + Vec2::new(angle.cos(), angle.sin()) * r
}

/// Draw the dial for `input` on a `size × size` surface.
#[must_use]
pub fn draw_dial(input: &GaugeInput, size: f32) -> DisplayList {
    let mut list = DisplayList::new(size, size);
    let center = Vec2::splat(size / 2.0);
    let ceiling = input.ceiling();

    list.arc(
        center,
        RADIUS,
        START_ANGLE,
        END_ANGLE,
        Stroke::new(rgba(ACCENT, 0.1), 32.0),
    );

    let mut prev_end = 0.0;
    for seg in &input.segments {
        list.arc(
            center,
            RADIUS,
            angle_for(prev_end, ceiling),
            angle_for(seg.end, ceiling),
            Stroke::new(with_alpha(seg.color, 0.25), 30.0),
        );
        prev_end = seg.end;
    }

    let needle_angle = angle_for(input.value, ceiling);
    let color = input
        .active_segment()
        .map_or([1.0, 1.0, 1.0], |s| s.color);

    list.arc(
        center,
        RADIUS,
        START_ANGLE,
        needle_angle,
        Stroke::new(with_alpha(color, 1.0), 36.0).round().glow(30.0),
    );
    list.line(
        polar(center, needle_angle, NEEDLE_INNER),
        polar(center, needle_angle, NEEDLE_OUTER),
        Stroke::new(with_alpha(color, 1.0), 5.0).round().glow(22.0),
    );

    for tick in TICKS {
        let angle = angle_for(tick, ceiling);
        list.line(
            polar(center, angle, RADIUS - 25.0),
            polar(center, angle, RADIUS - 10.0),
            Stroke::new(rgba(ACCENT, 0.6), 3.0).round(),
        );
        let label = polar(center, angle, RADIUS - 48.0);
        list.text(
            label + Vec2::new(0.0, 4.0),
            format!("{tick:.2}"),
            13.0,
            TextAlign::Center,
            rgba(ACCENT, 0.7),
        );
    }

    let value_text = if input.value.is_finite() {
        format!("{:.3}", input.value)
    } else {
        "--".to_owned()
    };
    list.text_run(TextRun {
        pos: center + Vec2::new(0.0, 8.0),
        text: value_text,
        size: 40.0,
        bold: true,
        align: TextAlign::Center,
        paint: Paint::Solid(with_alpha(color, 1.0)),
        glow: 20.0,
    });
    list.text(
        center + Vec2::new(0.0, 30.0),
        "R-MERGE",
        12.0,
        TextAlign::Center,
        rgba(0xaa_aaaa, 1.0),
    );
    if let Some(seg) = input.active_segment() {
        list.text(
            center + Vec2::new(0.0, 52.0),
            seg.label,
            14.0,
            TextAlign::Center,
            with_alpha(seg.color, 1.0),
        );
    }
    list
}

/// Draw the gauge and classify all three inputs.
#[must_use]
pub fn render(
    r_merge: f32,
    cc_half: f32,
    mosaicity: f32,
    frame: FrameReadings,
    size: f32,
) -> GaugeReadout {
    let input = GaugeInput::r_merge(r_merge);
    let dial = draw_dial(&input, size);

    let cc_grade = Grade::cc_half(cc_half);
    let mosaicity_grade = Grade::mosaicity(mosaicity);

    let mut cards = Vec::with_capacity(4);
    if let Some(ios) = frame.i_over_sigma.filter(|v| *v != 0.0) {
        cards.push(QualityCard {
            title: "CURRENT FRAME I/σ",
            value: format!("{ios:.2}"),
            grade: Grade::frame_i_over_sigma(ios),
        });
    }
    if let Some(c) = frame.completeness.filter(|v| *v != 0.0) {
        cards.push(QualityCard {
            title: "CURRENT COMPLETENESS",
            value: format!("{c:.1}%"),
            grade: Grade::frame_completeness(c),
        });
    }
    cards.push(QualityCard {
        title: "CC½",
        value: format!("{cc_half:.4}"),
        grade: cc_grade,
    });
    cards.push(QualityCard {
        title: "MOSAICITY",
        value: format!("{mosaicity:.2}°"),
        grade: mosaicity_grade,
    });

    GaugeReadout {
        dial,
        r_merge: RMergeBand::of(r_merge),
        cc_half: cc_grade,
        mosaicity: mosaicity_grade,
        cards,
    }
}
