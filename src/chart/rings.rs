//! Resolution ring overlay for the diffraction image.
//!
//! One circle per shell, centred on the beam, coloured by the shell's I/σ
//! and labelled with its resolution. The overlay follows the image's pan
//! and zoom, so ring geometry and labels are mapped through the
//! [`Viewport`] transform about the canvas centre.

use glam::{Affine2, Vec2};

use super::canvas::{DisplayList, Paint, Stroke, TextAlign, TextRun};
use super::shells::bar_color;
use crate::metrics::ResolutionShell;
use crate::util::ramp::{hex_rgb, with_alpha};
use crate::viewport::Viewport;

/// Detector radius in image pixels for the standard shell edges.
const RADIUS_TABLE: [(f32, f32); 6] = [
    (8.0, 120.0),
    (4.0, 220.0),
    (2.5, 360.0),
    (2.0, 520.0),
    (1.7, 680.0),
    (1.5, 820.0),
];
/// Off-table rings fall at `RADIUS_SCALE / resolution`.
const RADIUS_SCALE: f32 = 850.0;
/// I/σ from which a ring pulses while playing.
const EXCELLENT: f32 = 10.0;
/// Pulse angular rate in radians per second.
const PULSE_RATE: f32 = 2.5;

const LINE_WIDTH: f32 = 3.0;
const LABEL_SIZE: f32 = 18.0;
const LABEL_GAP: f32 = 10.0;
const DETAIL_SIZE: f32 = 14.0;
const DETAIL_GAP: f32 = 30.0;

/// Ring radius in unzoomed image pixels, or `None` for a resolution that
/// cannot be placed.
#[must_use]
pub fn radius_for(resolution: f32) -> Option<f32> {
    if !resolution.is_finite() || resolution <= 0.0 {
        return None;
    }
    let radius = RADIUS_TABLE
        .iter()
        .find(|(res, _)| (res - resolution).abs() < 1e-4)
        .map_or(RADIUS_SCALE / resolution, |(_, r)| *r);
    Some(radius)
}

/// Stroke opacity for a shell. Only excellent shells animate, and only
/// while playing.
#[must_use]
pub fn ring_alpha(i_over_sigma: f32, playing: bool, time: f32) -> f32 {
    if i_over_sigma >= EXCELLENT {
        if playing {
            (time * PULSE_RATE).sin() * 0.2 + 0.8
        } else {
            1.0
        }
    } else if i_over_sigma >= super::shells::NOISE_FLOOR {
        0.9
    } else {
        0.7
    }
}

/// Draw the ring overlay for `shells` on a square `size` canvas.
///
/// `time` is the frame clock in seconds. Shells with a non-positive or
/// non-finite resolution are skipped.
#[must_use]
pub fn render(
    shells: &[ResolutionShell],
    viewport: &Viewport,
    playing: bool,
    time: f32,
    size: f32,
) -> DisplayList {
    let mut list = DisplayList::new(size, size);
    list.clear([0.0; 4]);

    let to_screen = Affine2::from_translation(Vec2::splat(size / 2.0)) * viewport.transform();
    let zoom = viewport.zoom();
    let center = to_screen.transform_point2(Vec2::ZERO);

    for shell in shells {
        let Some(radius) = radius_for(shell.resolution) else {
            continue;
        };
        let ios = if shell.i_over_sigma.is_finite() {
            shell.i_over_sigma
        } else {
            0.0
        };
        let color = bar_color(ios);

        list.stroke_circle(
            center,
            radius * zoom,
            Stroke::new(with_alpha(color, ring_alpha(ios, playing, time)), LINE_WIDTH * zoom),
        );
        list.text_run(TextRun {
            pos: to_screen.transform_point2(Vec2::new(0.0, -radius - LABEL_GAP)),
            text: format!("{}Å", shell.resolution),
            size: LABEL_SIZE * zoom,
            bold: true,
            align: TextAlign::Center,
            paint: Paint::Solid(with_alpha(color, 1.0)),
            glow: 0.0,
        });
        list.text_run(TextRun {
            pos: to_screen.transform_point2(Vec2::new(0.0, -radius - DETAIL_GAP)),
            text: format!("I/σ: {ios:.1}"),
            size: DETAIL_SIZE * zoom,
            bold: false,
            align: TextAlign::Center,
            paint: Paint::Solid(with_alpha(hex_rgb(0xff_ffff), 1.0)),
            glow: 0.0,
        });
    }
    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::canvas::DrawCmd;
    use crate::metrics::tests::shell;

    fn circles(list: &DisplayList) -> Vec<(Vec2, f32, Stroke)> {
        list.commands()
            .iter()
            .filter_map(|c| match c {
                DrawCmd::StrokeCircle {
                    center,
                    radius,
                    stroke,
                } => Some((*center, *radius, *stroke)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn standard_edges_use_the_table() {
        assert_eq!(radius_for(8.0), Some(120.0));
        assert_eq!(radius_for(2.5), Some(360.0));
        assert_eq!(radius_for(1.5), Some(820.0));
        assert!((radius_for(3.0).unwrap() - 850.0 / 3.0).abs() < 1e-4);
        assert_eq!(radius_for(0.0), None);
        assert_eq!(radius_for(f32::NAN), None);
    }

    #[test]
    fn excellent_rings_pulse_only_while_playing() {
        assert_eq!(ring_alpha(12.0, false, 3.0), 1.0);
        let t = 0.2;
        let expected = (t * 2.5_f32).sin() * 0.2 + 0.8;
        assert!((ring_alpha(12.0, true, t) - expected).abs() < 1e-6);
        assert_eq!(ring_alpha(5.0, true, t), 0.9);
        assert_eq!(ring_alpha(1.0, true, t), 0.7);
    }

    #[test]
    fn rings_follow_pan_and_zoom() {
        let mut vp = Viewport::new();
        let _ = vp.set_zoom(2.0);
        vp.press(Vec2::ZERO);
        let _ = vp.drag_to(Vec2::new(30.0, -10.0));
        let list = render(&[shell(4.0, 12.0, 99.0, 100)], &vp, false, 0.0, 1024.0);

        let c = circles(&list);
        assert_eq!(c.len(), 1);
        let (center, radius, stroke) = c[0];
        assert_eq!(center, Vec2::new(542.0, 502.0));
        assert_eq!(radius, 440.0);
        assert_eq!(stroke.width, 6.0);
        assert_eq!(stroke.color, with_alpha(hex_rgb(0x00ff88), 1.0));

        let label = list.texts().find(|t| t.text == "4Å").unwrap();
        assert_eq!(label.pos, Vec2::new(542.0, 502.0 - 2.0 * 230.0));
        assert_eq!(label.size, 36.0);
        assert!(label.bold);
        assert!(list.has_text("I/σ: 12.0"));
    }

    #[test]
    fn default_view_colours_by_band() {
        let shells = [
            shell(8.0, 25.0, 99.0, 100),
            shell(2.5, 4.0, 95.0, 100),
            shell(1.7, 0.5, 60.0, 100),
        ];
        let vp = Viewport::new();
        let list = render(&shells, &vp, false, 0.0, 1024.0);
        let c = circles(&list);
        assert_eq!(c.len(), 3);
        assert!(c.iter().all(|(center, _, _)| *center == Vec2::splat(512.0)));
        assert_eq!(c[1].1, 360.0 * vp.zoom());
        assert_eq!(c[1].2.color, with_alpha(hex_rgb(0x00d9ff), 0.9));
        assert_eq!(c[2].2.color, with_alpha(hex_rgb(0xff6b6b), 0.7));
    }

    #[test]
    fn unplaceable_shells_are_skipped() {
        let list = render(
            &[shell(0.0, 5.0, 90.0, 10), shell(-1.0, 5.0, 90.0, 10)],
            &Viewport::new(),
            true,
            1.0,
            512.0,
        );
        assert!(circles(&list).is_empty());
        assert_eq!(list.texts().count(), 0);
    }
}
