//! Scrolling line/area chart of one per-frame metric.
//!
//! The chart is redrawn every display refresh. `time` only drives cosmetic
//! motion (scanline, threshold pulse, current-point ring); the history slice
//! is read, never modified.

use glam::Vec2;

use super::canvas::{rgba, DisplayList, Paint, Rect, Stroke, TextAlign, TextRun};
use crate::metrics::{FrameMetrics, MetricKey};
use crate::util::ramp::{with_alpha, Ramp, Rgb};

/// Plot margins in surface units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    /// Above the plot.
    pub top: f32,
    /// Right of the plot.
    pub right: f32,
    /// Below the plot.
    pub bottom: f32,
    /// Left of the plot.
    pub left: f32,
}

/// Margins of the time-series plot rectangle.
pub const MARGINS: Margins = Margins {
    top: 40.0,
    right: 30.0,
    bottom: 40.0,
    left: 60.0,
};

const ACCENT: u32 = 0x00_d9ff;
const THRESHOLD_RED: u32 = 0xff_3333;
const MUTED: u32 = 0x66_6666;

/// What to plot and how to colour it.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesStyle {
    /// Per-frame scalar to plot.
    pub metric: MetricKey,
    /// Chart title.
    pub label: String,
    /// Series colour.
    pub color: Rgb,
    /// Optional dashed reference line.
    pub threshold: Option<f32>,
}

/// Vertical value domain of the plot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YDomain {
    /// Value at the bottom edge.
    pub min: f32,
    /// Value at the top edge.
    pub max: f32,
}

impl YDomain {
    /// `[min(0, min·0.9), max(max, threshold)·1.1]`.
    #[must_use]
    pub fn of(values: &[f32], threshold: Option<f32>) -> Self {
        let lo = values.iter().copied().fold(f32::INFINITY, f32::min);
        let hi = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let lo = if lo.is_finite() { lo } else { 0.0 };
        let hi = if hi.is_finite() { hi } else { 0.0 };
        let threshold = threshold.filter(|t| t.is_finite()).unwrap_or(0.0);
        Self {
            min: (lo * 0.9).min(0.0),
            max: hi.max(threshold) * 1.1,
        }
    }

    /// Span of the domain; a non-positive span is replaced by `1`.
    #[must_use]
    pub fn range(&self) -> f32 {
        let r = self.max - self.min;
        if r > 0.0 {
            r
        } else {
            1.0
        }
    }

    /// Surface y of `value` inside `plot`.
    #[must_use]
    pub fn to_y(&self, value: f32, plot: Rect) -> f32 {
        plot.bottom() - ((value - self.min) / self.range()) * plot.h
    }
}

/// Surface x of sample `index` out of `n`. A single sample sits at the left
/// edge.
#[must_use]
pub fn x_at(index: usize, n: usize, plot: Rect) -> f32 {
    let denom = n.saturating_sub(1).max(1) as f32;
    plot.x + (index as f32 / denom) * plot.w
}

/// Plot rectangle for a surface of `size`.
#[must_use]
pub fn plot_rect(size: Vec2) -> Rect {
    Rect::new(
        MARGINS.left,
        MARGINS.top,
        (size.x - MARGINS.left - MARGINS.right).max(0.0),
        (size.y - MARGINS.top - MARGINS.bottom).max(0.0),
    )
}

/// Sample positions of `values` in surface space.
#[must_use]
pub fn series_points(values: &[f32], domain: YDomain, plot: Rect) -> Vec<Vec2> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| Vec2::new(x_at(i, values.len(), plot), domain.to_y(*v, plot)))
        .collect()
}

fn title(list: &mut DisplayList, label: &str, width: f32) {
    list.text_run(TextRun {
        pos: Vec2::new(width / 2.0, 25.0),
        text: label.to_owned(),
        size: 18.0,
        bold: true,
        align: TextAlign::Center,
        paint: Paint::LinearGradient {
            start: Vec2::new(0.0, 15.0),
            end: Vec2::new(0.0, 35.0),
            ramp: Ramp::new(
                (0.0, rgba(ACCENT, 1.0)),
                [(0.5, rgba(0xff_ffff, 1.0)), (1.0, rgba(ACCENT, 1.0))],
            ),
        },
        glow: 15.0,
    });
}

/// Draw the chart for `history` (frames `1..=current_frame`).
#[must_use]
pub fn render(
    history: &[FrameMetrics],
    current_frame: u32,
    style: &SeriesStyle,
    size: Vec2,
    time: f32,
) -> DisplayList {
    let (width, height) = (size.x, size.y);
    let mut list = DisplayList::new(width, height);
    let plot = plot_rect(size);
    let unit = style.metric.unit();

    list.clear(rgba(0x00_0000, 1.0));
    let scan_alpha = 0.02 + (time * 2.0).sin() * 0.01;
    let scan_y = if height > 0.0 {
        (time * 50.0).rem_euclid(height)
    } else {
        0.0
    };
    list.fill_rect(
        Rect::new(0.0, scan_y, width, 2.0),
        Paint::Solid(rgba(ACCENT, scan_alpha)),
    );

    if history.is_empty() {
        title(&mut list, &style.label, width);
        list.text(
            Vec2::new(width / 2.0, plot.y + plot.h / 2.0),
            "NO DATA",
            14.0,
            TextAlign::Center,
            rgba(MUTED, 1.0),
        );
        return list;
    }

    let values: Vec<f32> = history.iter().map(|f| style.metric.value(f)).collect();
    let domain = YDomain::of(&values, style.threshold);
    let n = values.len();

    // horizontal grid, labelled top to bottom
    for i in 0..=5 {
        let y = plot.y + (plot.h / 5.0) * i as f32;
        let fade = 1.0 - (i as f32 / 5.0) * 0.5;
        list.line(
            Vec2::new(plot.x, y),
            Vec2::new(plot.right(), y),
            Stroke::new(rgba(ACCENT, 0.15 * fade), 1.0).glow(5.0),
        );
        let value = domain.max - (domain.range() / 5.0) * i as f32;
        list.text_run(TextRun {
            pos: Vec2::new(plot.x - 10.0, y + 4.0),
            text: format!("{value:.1}{unit}"),
            size: 12.0,
            bold: true,
            align: TextAlign::Right,
            paint: Paint::Solid(rgba(ACCENT, 1.0)),
            glow: 8.0,
        });
    }

    // vertical grid, every other line labelled with a frame number
    for i in 0..=10 {
        let x = plot.x + (plot.w / 10.0) * i as f32;
        list.line(
            Vec2::new(x, plot.y),
            Vec2::new(x, plot.bottom()),
            Stroke::new([1.0, 1.0, 1.0, 0.05], 1.0),
        );
        if i % 2 == 0 {
            let frame_num = ((n as f32 / 10.0) * i as f32).floor() as u32 + 1;
            list.text(
                Vec2::new(x, plot.bottom() + 20.0),
                frame_num.to_string(),
                11.0,
                TextAlign::Center,
                rgba(MUTED, 1.0),
            );
        }
    }

    if let Some(threshold) = style.threshold.filter(|t| t.is_finite()) {
        let y = domain.to_y(threshold, plot);
        let pulse = 0.5 + (time * 3.0).sin() * 0.3;
        list.line(
            Vec2::new(plot.x, y),
            Vec2::new(plot.right(), y),
            Stroke::new(rgba(THRESHOLD_RED, 0.7 + pulse * 0.3), 1.0)
                .dashed(8.0, 4.0)
                .glow(15.0 * pulse),
        );
        list.fill_rect(
            Rect::new(plot.x + 5.0, y - 20.0, 130.0, 16.0),
            Paint::Solid(rgba(THRESHOLD_RED, 0.2)),
        );
        list.text_run(TextRun {
            pos: Vec2::new(plot.x + 10.0, y - 8.0),
            text: format!("THRESHOLD: {threshold}{unit}"),
            size: 11.0,
            bold: true,
            align: TextAlign::Left,
            paint: Paint::Solid(rgba(THRESHOLD_RED, 1.0)),
            glow: 10.0,
        });
    }

    let points = series_points(&values, domain, plot);

    let mut area = Vec::with_capacity(n + 2);
    area.push(Vec2::new(plot.x, plot.bottom()));
    area.extend_from_slice(&points);
    area.push(Vec2::new(plot.right(), plot.bottom()));
    list.fill_polygon(
        area,
        Paint::vertical(
            plot.y,
            plot.bottom(),
            with_alpha(style.color, 0.25),
            with_alpha(style.color, 0.0),
        ),
    );

    list.polyline(
        points.clone(),
        Stroke::new(with_alpha(style.color, 1.0), 2.5).glow(20.0),
    );
    let edge = with_alpha(style.color, 1.0);
    list.painted_polyline(
        points.clone(),
        Stroke::new(edge, 2.0).glow(5.0),
        Paint::horizontal(plot.x, plot.right(), &[edge, rgba(0xff_ffff, 1.0), edge]),
    );

    for p in points.iter().step_by(10) {
        list.fill_circle(*p, 6.0, Paint::Solid(with_alpha(style.color, 0.25)), 10.0);
        list.fill_circle(*p, 3.0, Paint::Solid(with_alpha(style.color, 1.0)), 0.0);
        list.fill_circle(*p, 1.5, Paint::Solid(rgba(0xff_ffff, 1.0)), 0.0);
    }

    let current = (current_frame as usize).checked_sub(1).filter(|i| *i < n);
    if let Some(idx) = current {
        let p = points[idx];
        let value = values[idx];
        let ring = 8.0 + (time * 5.0).sin() * 2.0;
        list.stroke_circle(
            p,
            ring,
            Stroke::new(with_alpha(style.color, 0.5), 2.0).glow(20.0),
        );
        list.fill_circle(p, 6.0, Paint::Solid(with_alpha(style.color, 1.0)), 15.0);
        list.fill_circle(p, 3.0, Paint::Solid(rgba(0xff_ffff, 1.0)), 0.0);

        let (box_w, box_h) = (80.0, 30.0);
        let box_x = if p.x > width / 2.0 {
            p.x - box_w - 15.0
        } else {
            p.x + 15.0
        };
        let badge = Rect::new(box_x, p.y - 15.0, box_w, box_h);
        list.fill_rect(badge, Paint::Solid(rgba(0x00_0000, 0.9)));
        list.stroke_rect(badge, Stroke::new(with_alpha(style.color, 1.0), 2.0).glow(8.0));
        list.text_run(TextRun {
            pos: Vec2::new(badge.x + box_w / 2.0, badge.y + box_h / 2.0 + 5.0),
            text: format!("{value:.1}{unit}"),
            size: 14.0,
            bold: true,
            align: TextAlign::Center,
            paint: Paint::Solid(with_alpha(style.color, 1.0)),
            glow: 0.0,
        });
    }

    title(&mut list, &style.label, width);
    list.text(
        Vec2::new(width / 2.0, height - 5.0),
        "FRAME NUMBER",
        11.0,
        TextAlign::Center,
        rgba(MUTED, 1.0),
    );
    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::canvas::DrawCmd;
    use crate::metrics::tests::frame;
    use crate::util::ramp::hex_rgb;

    fn style(threshold: Option<f32>) -> SeriesStyle {
        SeriesStyle {
            metric: MetricKey::OverallIOverSigma,
            label: "I/σ(I) PROGRESSION".to_owned(),
            color: hex_rgb(0x00d9ff),
            threshold,
        }
    }

    const SIZE: Vec2 = Vec2::new(400.0, 180.0);

    #[test]
    fn single_sample_sits_on_the_left_edge() {
        let plot = plot_rect(SIZE);
        assert_eq!(x_at(0, 1, plot), MARGINS.left);
        assert_eq!(x_at(0, 0, plot), MARGINS.left);
        let history = [frame(1, 20.0, 95.0)];
        let list = render(&history, 1, &style(Some(15.0)), SIZE, 3.7);
        assert!(list.geometry_points().all(|p| p.is_finite()));
        let line = list.commands().iter().find_map(|c| match c {
            DrawCmd::Polyline(..) | DrawCmd::PaintedPolyline(..) => Some(()),
            _ => None,
        });
        // one point is not a line
        assert!(line.is_none());
    }

    #[test]
    fn last_sample_sits_on_the_right_edge() {
        let plot = plot_rect(SIZE);
        assert_eq!(x_at(9, 10, plot), plot.right());
    }

    #[test]
    fn domain_includes_zero_and_threshold() {
        let d = YDomain::of(&[10.0, 12.0], Some(15.0));
        assert_eq!(d.min, 0.0);
        assert!((d.max - 16.5).abs() < 1e-5);
        let d = YDomain::of(&[-10.0, 5.0], None);
        assert_eq!(d.min, -9.0);
        assert!((d.max - 5.5).abs() < 1e-5);
    }

    #[test]
    fn flat_zero_series_does_not_divide_by_zero() {
        let d = YDomain::of(&[0.0, 0.0, 0.0], None);
        assert_eq!(d.range(), 1.0);
        let plot = plot_rect(SIZE);
        assert!(d.to_y(0.0, plot).is_finite());
        let history = [frame(1, 0.0, 0.0), frame(2, 0.0, 0.0)];
        let list = render(&history, 2, &style(None), SIZE, 0.0);
        assert!(list.geometry_points().all(|p| p.is_finite()));
    }

    #[test]
    fn labels_follow_the_reference_layout() {
        let history: Vec<_> = (1..=25).map(|i| frame(i, 18.0 + i as f32 * 0.1, 96.0)).collect();
        let mut s = style(Some(15.0));
        s.metric = MetricKey::OverallCompleteness;
        let list = render(&history, 25, &s, SIZE, 1.0);
        assert!(list.has_text("THRESHOLD: 15%"));
        assert!(list.has_text("FRAME NUMBER"));
        assert!(list.has_text("96.0%"));
        // frame numbers floor(25/10 * i) + 1 for even i
        for label in ["1", "6", "11", "16", "21", "26"] {
            assert!(list.has_text(label), "missing {label}");
        }
    }

    #[test]
    fn series_line_gets_a_gradient_overstroke() {
        let history = [frame(1, 12.0, 90.0), frame(2, 14.0, 91.0), frame(3, 13.0, 92.0)];
        let list = render(&history, 3, &style(None), SIZE, 0.0);
        let solid = list.commands().iter().find_map(|c| match c {
            DrawCmd::Polyline(pts, stroke) if pts.len() == 3 => Some((pts.clone(), *stroke)),
            _ => None,
        });
        let (pts, stroke) = solid.unwrap();
        assert_eq!((stroke.width, stroke.glow), (2.5, 20.0));

        let (over_pts, over, paint) = list
            .commands()
            .iter()
            .find_map(|c| match c {
                DrawCmd::PaintedPolyline(p, s, paint) => Some((p.clone(), *s, paint.clone())),
                _ => None,
            })
            .unwrap();
        assert_eq!(over_pts, pts);
        assert_eq!((over.width, over.glow), (2.0, 5.0));
        let plot = plot_rect(SIZE);
        let edge = with_alpha(hex_rgb(0x00d9ff), 1.0);
        assert_eq!(paint.color_at(Vec2::new(plot.x, 0.0)), edge);
        assert_eq!(paint.color_at(Vec2::new((plot.x + plot.right()) / 2.0, 0.0)), [1.0; 4]);
        assert_eq!(paint.color_at(Vec2::new(plot.right(), 0.0)), edge);
    }

    #[test]
    fn empty_history_shows_placeholder() {
        let list = render(&[], 0, &style(Some(15.0)), SIZE, 0.0);
        assert!(list.has_text("NO DATA"));
        assert!(!list.texts().any(|t| t.text.starts_with("THRESHOLD")));
    }

    #[test]
    fn rendering_does_not_touch_history() {
        let history = vec![frame(1, 12.0, 90.0), frame(2, 14.0, 91.0)];
        let before = history.clone();
        let _ = render(&history, 2, &style(Some(15.0)), SIZE, 12.5);
        assert_eq!(history, before);
    }

    #[test]
    fn current_point_outside_history_is_not_highlighted() {
        let history = [frame(1, 12.0, 90.0), frame(2, 14.0, 91.0)];
        let list = render(&history, 7, &style(None), SIZE, 0.0);
        assert!(!list
            .commands()
            .iter()
            .any(|c| matches!(c, DrawCmd::StrokeCircle { .. })));
    }
}
