//! Per-shell I/σ bar chart for the current frame.

use glam::Vec2;

use super::canvas::{rgba, DisplayList, Paint, Rect, Stroke, TextAlign, TextRun};
use crate::metrics::ResolutionShell;
use crate::util::ramp::{hex_rgb, with_alpha, Rgb};

/// I/σ below which a shell is considered noise.
pub const NOISE_FLOOR: f32 = 2.0;

const TOP: f32 = 20.0;
const RIGHT: f32 = 20.0;
const BOTTOM: f32 = 40.0;
const LEFT: f32 = 50.0;

/// Bar colour for a shell's I/σ.
#[must_use]
pub fn bar_color(i_over_sigma: f32) -> Rgb {
    if i_over_sigma >= 10.0 {
        hex_rgb(0x00_ff88)
    } else if i_over_sigma >= NOISE_FLOOR {
        hex_rgb(0x00_d9ff)
    } else {
        hex_rgb(0xff_6b6b)
    }
}

/// Draw one bar per shell plus the dashed noise-floor line.
///
/// With no shells only the background and a placeholder are drawn. A frame
/// whose shells all have zero I/σ draws zero-height bars.
#[must_use]
pub fn render(shells: &[ResolutionShell], size: Vec2) -> DisplayList {
    let (width, height) = (size.x, size.y);
    let mut list = DisplayList::new(width, height);
    let plot_w = (width - LEFT - RIGHT).max(0.0);
    let plot_h = (height - TOP - BOTTOM).max(0.0);

    list.fill_rect(
        Rect::new(0.0, 0.0, width, height),
        Paint::Solid(rgba(0x1a_1a1a, 1.0)),
    );
    list.text_run(TextRun {
        pos: Vec2::new(width / 2.0, 15.0),
        text: "I/σ(I) per Resolution Shell".to_owned(),
        size: 11.0,
        bold: true,
        align: TextAlign::Center,
        paint: Paint::Solid(rgba(0xff_ffff, 1.0)),
        glow: 0.0,
    });

    if shells.is_empty() {
        list.text(
            Vec2::new(width / 2.0, TOP + plot_h / 2.0),
            "NO DATA",
            12.0,
            TextAlign::Center,
            rgba(0x66_6666, 1.0),
        );
        return list;
    }

    let peak = shells
        .iter()
        .map(|s| s.i_over_sigma)
        .filter(|v| v.is_finite())
        .fold(0.0_f32, f32::max)
        * 1.1;
    let scale = if peak > 0.0 { peak } else { 1.0 };
    let bar_w = plot_w / shells.len() as f32;
    let base = TOP + plot_h;

    for (i, shell) in shells.iter().enumerate() {
        let ios = if shell.i_over_sigma.is_finite() {
            shell.i_over_sigma.max(0.0)
        } else {
            0.0
        };
        let x = LEFT + i as f32 * bar_w;
        let bar_h = (ios / scale) * plot_h;
        let y = base - bar_h;
        let color = bar_color(ios);

        list.fill_rect(
            Rect::new(x + 2.0, y, (bar_w - 4.0).max(0.0), bar_h),
            Paint::Solid(with_alpha(color, 1.0)),
        );
        list.text(
            Vec2::new(x + bar_w / 2.0, height - BOTTOM + 15.0),
            format!("{}Å", shell.resolution),
            9.0,
            TextAlign::Center,
            rgba(0xff_ffff, 1.0),
        );
        list.text_run(TextRun {
            pos: Vec2::new(x + bar_w / 2.0, y - 5.0),
            text: format!("{ios:.1}"),
            size: 10.0,
            bold: true,
            align: TextAlign::Center,
            paint: Paint::Solid(with_alpha(color, 1.0)),
            glow: 0.0,
        });
    }

    let floor_y = base - (NOISE_FLOOR / scale) * plot_h;
    list.line(
        Vec2::new(LEFT, floor_y),
        Vec2::new(width - RIGHT, floor_y),
        Stroke::new(rgba(0xff_6b6b, 1.0), 1.0).dashed(5.0, 5.0),
    );
    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::canvas::DrawCmd;
    use crate::metrics::tests::shell;

    const SIZE: Vec2 = Vec2::new(400.0, 200.0);

    fn bars(list: &DisplayList) -> Vec<Rect> {
        list.commands()
            .iter()
            .skip(1)
            .filter_map(|c| match c {
                DrawCmd::FillRect(r, _) => Some(*r),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn tallest_bar_uses_ninety_percent_of_the_plot() {
        let list = render(&[shell(4.0, 22.0, 99.0, 100), shell(2.0, 11.0, 90.0, 100)], SIZE);
        let b = bars(&list);
        assert_eq!(b.len(), 2);
        let plot_h = 200.0 - 20.0 - 40.0;
        assert!((b[0].h - plot_h / 1.1).abs() < 1e-3);
        assert!((b[1].h - plot_h / 2.2).abs() < 1e-3);
        assert!(list.has_text("4Å"));
        assert!(list.has_text("22.0"));
    }

    #[test]
    fn colors_by_threshold() {
        assert_eq!(bar_color(10.0), hex_rgb(0x00ff88));
        assert_eq!(bar_color(2.0), hex_rgb(0x00d9ff));
        assert_eq!(bar_color(1.99), hex_rgb(0xff6b6b));
    }

    #[test]
    fn all_zero_shells_draw_flat_bars() {
        let list = render(&[shell(4.0, 0.0, 0.0, 0), shell(2.0, 0.0, 0.0, 0)], SIZE);
        assert!(bars(&list).iter().all(|r| r.h == 0.0));
        assert!(list.geometry_points().all(|p| p.is_finite()));
    }

    #[test]
    fn no_shells_is_a_placeholder() {
        let list = render(&[], SIZE);
        assert!(list.has_text("NO DATA"));
        assert!(bars(&list).is_empty());
    }
}
