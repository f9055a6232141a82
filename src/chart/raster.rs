//! Software rasterizer for [`DisplayList`]s.
//!
//! Produces a straight-alpha RGBA8 buffer. Geometry is antialiased by
//! distance-to-edge coverage; text runs are skipped because glyph shaping
//! belongs to whichever host presents the pixels.

use std::f32::consts::TAU;

use glam::Vec2;

use super::canvas::{DisplayList, DrawCmd, LineCap, Paint, Rect, Stroke};
use crate::util::ramp::Rgba;

/// Largest chord length, in pixels, used when flattening arcs.
const ARC_CHORD: f32 = 2.0;

/// Opacity multiplier of the halo drawn under glowing strokes.
const GLOW_ALPHA: f32 = 0.2;

/// RGBA8 pixel buffer.
#[derive(Debug, Clone)]
pub struct Rasterizer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Rasterizer {
    /// Transparent buffer of the given size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    /// Rasterize `list` into a fresh buffer sized to the list's surface.
    #[must_use]
    pub fn rasterize(list: &DisplayList) -> Self {
        let mut r = Self::new(
            list.width().max(0.0).ceil() as u32,
            list.height().max(0.0).ceil() as u32,
        );
        r.draw(list);
        r
    }

    /// Buffer width.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Buffer height.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 bytes, row-major.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// One pixel, or `None` out of bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    /// Replay every command of `list` on top of the current contents.
    pub fn draw(&mut self, list: &DisplayList) {
        for cmd in list.commands() {
            self.draw_cmd(cmd);
        }
    }

    fn draw_cmd(&mut self, cmd: &DrawCmd) {
        match cmd {
            DrawCmd::Clear(color) => self.clear(*color),
            DrawCmd::FillRect(rect, paint) => self.fill_rect(*rect, paint),
            DrawCmd::StrokeRect(r, stroke) => {
                let pts = vec![
                    Vec2::new(r.x, r.y),
                    Vec2::new(r.right(), r.y),
                    Vec2::new(r.right(), r.bottom()),
                    Vec2::new(r.x, r.bottom()),
                    Vec2::new(r.x, r.y),
                ];
                self.stroke_path(&pts, stroke, None);
            }
            DrawCmd::Line(a, b, stroke) => self.stroke_path(&[*a, *b], stroke, None),
            DrawCmd::Polyline(pts, stroke) => self.stroke_path(pts, stroke, None),
            DrawCmd::PaintedPolyline(pts, stroke, paint) => {
                self.stroke_path(pts, stroke, Some(paint));
            }
            DrawCmd::FillPolygon(pts, paint) => self.fill_polygon(pts, paint),
            DrawCmd::Arc {
                center,
                radius,
                start,
                end,
                stroke,
            } => {
                let pts = flatten_arc(*center, *radius, *start, *end);
                self.stroke_path(&pts, stroke, None);
            }
            DrawCmd::FillCircle {
                center,
                radius,
                paint,
                glow,
            } => {
                if *glow > 0.0 {
                    let halo = Paint::Solid(scale_alpha(
                        paint.color_at(*center),
                        GLOW_ALPHA,
                    ));
                    self.fill_circle(*center, radius + glow * 0.5, &halo);
                }
                self.fill_circle(*center, *radius, paint);
            }
            DrawCmd::StrokeCircle {
                center,
                radius,
                stroke,
            } => {
                let pts = flatten_arc(*center, *radius, 0.0, TAU);
                self.stroke_path(&pts, stroke, None);
            }
            DrawCmd::Text(_) => {}
        }
    }

    fn clear(&mut self, color: Rgba) {
        let px = to_u8(color);
        for chunk in self.pixels.chunks_exact_mut(4) {
            chunk.copy_from_slice(&px);
        }
    }

    /// Source-over blend of `color` scaled by `coverage` into pixel `(x, y)`.
    fn blend(&mut self, x: i64, y: i64, color: Rgba, coverage: f32) {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height)
        {
            return;
        }
        let a = (color[3] * coverage).clamp(0.0, 1.0);
        if a <= 0.0 {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let dst_a = f32::from(self.pixels[i + 3]) / 255.0;
        let out_a = a + dst_a * (1.0 - a);
        for (c, channel) in color.iter().take(3).enumerate() {
            let dst = f32::from(self.pixels[i + c]) / 255.0;
            let src = channel.clamp(0.0, 1.0);
            let out = if out_a > 0.0 {
                (src * a + dst * dst_a * (1.0 - a)) / out_a
            } else {
                0.0
            };
            self.pixels[i + c] = (out * 255.0).round() as u8;
        }
        self.pixels[i + 3] = (out_a * 255.0).round() as u8;
    }

    fn fill_rect(&mut self, rect: Rect, paint: &Paint) {
        let x0 = rect.x.max(0.0).round() as i64;
        let y0 = rect.y.max(0.0).round() as i64;
        let x1 = rect.right().min(self.width as f32).round() as i64;
        let y1 = rect.bottom().min(self.height as f32).round() as i64;
        for y in y0..y1 {
            for x in x0..x1 {
                let c = paint.color_at(pixel_center(x, y));
                self.blend(x, y, c, 1.0);
            }
        }
    }

    /// Even-odd scanline fill sampled at pixel centres.
    fn fill_polygon(&mut self, pts: &[Vec2], paint: &Paint) {
        if pts.len() < 3 || pts.iter().any(|p| !p.is_finite()) {
            return;
        }
        let (min, max) = bounds(pts);
        let y0 = min.y.max(0.0).floor() as i64;
        let y1 = max.y.min(self.height as f32).ceil() as i64;
        let mut xs: Vec<f32> = Vec::new();
        for y in y0..y1 {
            let sy = y as f32 + 0.5;
            xs.clear();
            for i in 0..pts.len() {
                let a = pts[i];
                let b = pts[(i + 1) % pts.len()];
                if (a.y <= sy && b.y > sy) || (b.y <= sy && a.y > sy) {
                    let t = (sy - a.y) / (b.y - a.y);
                    xs.push(a.x + t * (b.x - a.x));
                }
            }
            xs.sort_by(f32::total_cmp);
            for span in xs.chunks_exact(2) {
                let from = (span[0] - 0.5).ceil().max(0.0) as i64;
                let to = (span[1] - 0.5).floor().min(self.width as f32 - 1.0) as i64;
                for x in from..=to {
                    let c = paint.color_at(pixel_center(x, y));
                    self.blend(x, y, c, 1.0);
                }
            }
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint) {
        if !center.is_finite() || !radius.is_finite() || radius <= 0.0 {
            return;
        }
        let x0 = (center.x - radius - 1.0).floor() as i64;
        let x1 = (center.x + radius + 1.0).ceil() as i64;
        let y0 = (center.y - radius - 1.0).floor() as i64;
        let y1 = (center.y + radius + 1.0).ceil() as i64;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let p = pixel_center(x, y);
                let coverage = (radius + 0.5 - p.distance(center)).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(x, y, paint.color_at(p), coverage);
                }
            }
        }
    }

    /// Stroke a path as one coverage mask so overlapping segments at joins
    /// do not blend twice. `paint`, when given, replaces the stroke colour.
    fn stroke_path(&mut self, pts: &[Vec2], stroke: &Stroke, paint: Option<&Paint>) {
        if pts.len() < 2 || pts.iter().any(|p| !p.is_finite()) {
            return;
        }
        let segments = match stroke.dash {
            Some([on, off]) if on > 0.0 && off >= 0.0 => dash(pts, on, off),
            _ => pts.windows(2).map(|w| (w[0], w[1])).collect(),
        };
        if stroke.glow > 0.0 {
            let halo = Stroke {
                color: stroke.color,
                width: stroke.width + stroke.glow,
                dash: None,
                cap: LineCap::Round,
                glow: 0.0,
            };
            self.stroke_segments(&segments, &halo, paint, GLOW_ALPHA);
        }
        self.stroke_segments(&segments, stroke, paint, 1.0);
    }

    fn stroke_segments(
        &mut self,
        segments: &[(Vec2, Vec2)],
        stroke: &Stroke,
        paint: Option<&Paint>,
        alpha: f32,
    ) {
        if segments.is_empty() || stroke.width.is_nan() || stroke.width <= 0.0 {
            return;
        }
        let hw = stroke.width * 0.5;
        let pad = hw + 1.0;
        let (mut min, mut max) = (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY));
        for (a, b) in segments {
            min = min.min(a.min(*b));
            max = max.max(a.max(*b));
        }
        let x0 = (min.x - pad).floor().max(0.0) as i64;
        let y0 = (min.y - pad).floor().max(0.0) as i64;
        let x1 = (max.x + pad).ceil().min(self.width as f32) as i64;
        let y1 = (max.y + pad).ceil().min(self.height as f32) as i64;
        if x1 <= x0 || y1 <= y0 {
            return;
        }
        let mw = (x1 - x0) as usize;
        let mut mask = vec![0.0_f32; mw * (y1 - y0) as usize];

        for &(a, b) in segments {
            let s0 = a.min(b) - Vec2::splat(pad);
            let s1 = a.max(b) + Vec2::splat(pad);
            let sy0 = (s0.y.floor() as i64).max(y0);
            let sy1 = (s1.y.ceil() as i64).min(y1);
            let sx0 = (s0.x.floor() as i64).max(x0);
            let sx1 = (s1.x.ceil() as i64).min(x1);
            for y in sy0..sy1 {
                for x in sx0..sx1 {
                    let d = segment_distance(pixel_center(x, y), a, b, stroke.cap);
                    let coverage = (hw + 0.5 - d).clamp(0.0, 1.0);
                    let slot = &mut mask[(y - y0) as usize * mw + (x - x0) as usize];
                    *slot = slot.max(coverage);
                }
            }
        }

        for (row, y) in (y0..y1).enumerate() {
            for (col, x) in (x0..x1).enumerate() {
                let coverage = mask[row * mw + col];
                if coverage > 0.0 {
                    let color = paint.map_or(stroke.color, |p| p.color_at(pixel_center(x, y)));
                    self.blend(x, y, scale_alpha(color, alpha), coverage);
                }
            }
        }
    }
}

fn pixel_center(x: i64, y: i64) -> Vec2 {
    Vec2::new(x as f32 + 0.5, y as f32 + 0.5)
}

fn bounds(pts: &[Vec2]) -> (Vec2, Vec2) {
    pts.iter().fold(
        (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
        |(lo, hi), p| (lo.min(*p), hi.max(*p)),
    )
}

fn to_u8(c: Rgba) -> [u8; 4] {
    c.map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
}

fn scale_alpha(mut c: Rgba, k: f32) -> Rgba {
    c[3] *= k;
    c
}

/// Distance from `p` to segment `ab`. Butt caps report infinity past the
/// endpoints.
fn segment_distance(p: Vec2, a: Vec2, b: Vec2, cap: LineCap) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return match cap {
            LineCap::Round => p.distance(a),
            LineCap::Butt => f32::INFINITY,
        };
    }
    let t = (p - a).dot(ab) / len_sq;
    match cap {
        LineCap::Butt if !(0.0..=1.0).contains(&t) => f32::INFINITY,
        _ => p.distance(a + ab * t.clamp(0.0, 1.0)),
    }
}

/// Flatten an arc into a polyline with chords no longer than [`ARC_CHORD`].
fn flatten_arc(center: Vec2, radius: f32, start: f32, end: f32) -> Vec<Vec2> {
    let sweep = end - start;
    if !sweep.is_finite() || !radius.is_finite() {
        return Vec::new();
    }
    let steps = ((sweep.abs() * radius) / ARC_CHORD).ceil().clamp(8.0, 4096.0) as usize;
    (0..=steps)
        .map(|i| {
            let a = start + sweep * (i as f32 / steps as f32);
            center + Vec2::new(a.cos(), a.sin()) * radius
        })
        .collect()
}

/// Split a polyline into the "on" pieces of an `[on, off]` dash pattern.
/// The pattern phase carries across vertices.
fn dash(pts: &[Vec2], on: f32, off: f32) -> Vec<(Vec2, Vec2)> {
    let period = on + off;
    let mut out = Vec::new();
    let mut phase = 0.0_f32;
    for w in pts.windows(2) {
        let (a, b) = (w[0], w[1]);
        let len = a.distance(b);
        if len <= 0.0 {
            continue;
        }
        let dir = (b - a) / len;
        let mut s = 0.0;
        while s < len {
            let in_period = phase % period;
            let (drawing, remaining) = if in_period < on {
                (true, on - in_period)
            } else {
                (false, period - in_period)
            };
            let step = remaining.min(len - s);
            if drawing {
                out.push((a + dir * s, a + dir * (s + step)));
            }
            s += step;
            phase += step;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::canvas::rgba;

    #[test]
    fn clear_and_fill_rect() {
        let mut list = DisplayList::new(8.0, 8.0);
        list.clear(rgba(0x000000, 1.0));
        list.fill_rect(Rect::new(2.0, 2.0, 4.0, 4.0), Paint::Solid(rgba(0xff0000, 1.0)));
        let r = Rasterizer::rasterize(&list);
        assert_eq!(r.pixel(0, 0), Some([0, 0, 0, 255]));
        assert_eq!(r.pixel(3, 3), Some([255, 0, 0, 255]));
        assert_eq!(r.pixel(6, 6), Some([0, 0, 0, 255]));
        assert_eq!(r.pixel(8, 0), None);
    }

    #[test]
    fn half_alpha_blends_over_black() {
        let mut list = DisplayList::new(2.0, 2.0);
        list.clear(rgba(0x000000, 1.0));
        list.fill_rect(Rect::new(0.0, 0.0, 2.0, 2.0), Paint::Solid([1.0, 1.0, 1.0, 0.5]));
        let r = Rasterizer::rasterize(&list);
        assert_eq!(r.pixel(1, 1), Some([128, 128, 128, 255]));
    }

    #[test]
    fn horizontal_line_covers_its_row() {
        let mut list = DisplayList::new(20.0, 10.0);
        list.line(
            Vec2::new(2.0, 5.5),
            Vec2::new(18.0, 5.5),
            Stroke::new(rgba(0x00ff00, 1.0), 1.0),
        );
        let r = Rasterizer::rasterize(&list);
        assert_eq!(r.pixel(10, 5).map(|p| p[1]), Some(255));
        assert_eq!(r.pixel(10, 1).map(|p| p[3]), Some(0));
        assert_eq!(r.pixel(0, 5).map(|p| p[3]), Some(0));
    }

    #[test]
    fn dashes_leave_gaps() {
        let segs = dash(&[Vec2::ZERO, Vec2::new(24.0, 0.0)], 8.0, 4.0);
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0], (Vec2::ZERO, Vec2::new(8.0, 0.0)));
        assert_eq!(segs[1], (Vec2::new(12.0, 0.0), Vec2::new(20.0, 0.0)));
    }

    #[test]
    fn polygon_fill_is_even_odd() {
        let mut list = DisplayList::new(10.0, 10.0);
        list.fill_polygon(
            vec![Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0), Vec2::new(0.0, 10.0)],
            Paint::Solid(rgba(0x0000ff, 1.0)),
        );
        let r = Rasterizer::rasterize(&list);
        assert_eq!(r.pixel(0, 0), Some([0, 0, 255, 255]));
        assert_eq!(r.pixel(9, 9), Some([0, 0, 255, 255]));
    }

    #[test]
    fn non_finite_geometry_is_skipped() {
        let mut list = DisplayList::new(4.0, 4.0);
        list.line(Vec2::new(f32::NAN, 0.0), Vec2::ONE, Stroke::new([1.0; 4], 1.0));
        list.fill_circle(Vec2::splat(f32::INFINITY), 2.0, Paint::Solid([1.0; 4]), 0.0);
        let r = Rasterizer::rasterize(&list);
        assert!(r.pixels().iter().all(|b| *b == 0));
    }

    #[test]
    fn arc_flattening_stays_on_the_circle() {
        let pts = flatten_arc(Vec2::new(200.0, 200.0), 150.0, 0.75 * std::f32::consts::PI, 2.25 * std::f32::consts::PI);
        assert!(pts.len() > 100);
        for p in pts {
            assert!((p.distance(Vec2::new(200.0, 200.0)) - 150.0).abs() < 1e-2);
        }
    }
}
