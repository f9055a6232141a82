//! Retained 2D draw commands.
//!
//! Chart renderers never touch pixels. They append commands to a
//! [`DisplayList`], which a host can replay on its own 2D backend or hand to
//! [`super::raster::Rasterizer`] for an RGBA buffer.

use glam::Vec2;

use crate::util::ramp::{Ramp, Rgba};

/// Axis-aligned rectangle, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub w: f32,
    /// Height.
    pub h: f32,
}

impl Rect {
    /// Construct from position and size.
    #[must_use]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Whether `p` lies inside (edges inclusive).
    #[must_use]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }
}

/// Fill source.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    /// Flat colour.
    Solid(Rgba),
    /// Colour varying along the segment `start → end`, parameterised by the
    /// projection of each point onto it (`0` at `start`, `1` at `end`).
    LinearGradient {
        /// Where the ramp parameter is `0`.
        start: Vec2,
        /// Where the ramp parameter is `1`.
        end: Vec2,
        /// Colours over `[0, 1]`.
        ramp: Ramp<Rgba>,
    },
}

impl Paint {
    /// Colour at `p`.
    #[must_use]
    pub fn color_at(&self, p: Vec2) -> Rgba {
        match self {
            Self::Solid(c) => *c,
            Self::LinearGradient { start, end, ramp } => {
                let axis = *end - *start;
                let len_sq = axis.length_squared();
                let t = if len_sq > 0.0 {
                    (p - *start).dot(axis) / len_sq
                } else {
                    0.0
                };
                ramp.sample(t.clamp(0.0, 1.0))
            }
        }
    }

    /// Horizontal gradient from `x0` to `x1` through evenly spaced `stops`.
    /// An empty `stops` is transparent.
    #[must_use]
    pub fn horizontal(x0: f32, x1: f32, stops: &[Rgba]) -> Self {
        let Some((&first, rest)) = stops.split_first() else {
            return Self::Solid([0.0; 4]);
        };
        let step = 1.0 / rest.len().max(1) as f32;
        Self::LinearGradient {
            start: Vec2::new(x0, 0.0),
            end: Vec2::new(x1, 0.0),
            ramp: Ramp::new(
                (0.0, first),
                rest.iter().enumerate().map(|(i, c)| ((i + 1) as f32 * step, *c)),
            ),
        }
    }

    /// Vertical two-stop gradient from `top` (at `y0`) to `bottom` (at `y1`).
    #[must_use]
    pub fn vertical(y0: f32, y1: f32, top: Rgba, bottom: Rgba) -> Self {
        Self::LinearGradient {
            start: Vec2::new(0.0, y0),
            end: Vec2::new(0.0, y1),
            ramp: Ramp::new((0.0, top), [(1.0, bottom)]),
        }
    }
}

/// End-of-line shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    /// Flat at the endpoint.
    #[default]
    Butt,
    /// Half-disc past the endpoint.
    Round,
}

/// Outline style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    /// Line colour.
    pub color: Rgba,
    /// Line width.
    pub width: f32,
    /// `[on, off]` dash pattern.
    pub dash: Option<[f32; 2]>,
    /// Cap style.
    pub cap: LineCap,
    /// Glow (shadow blur) radius; `0` for none.
    pub glow: f32,
}

impl Stroke {
    /// Solid butt-capped stroke without glow.
    #[must_use]
    pub const fn new(color: Rgba, width: f32) -> Self {
        Self {
            color,
            width,
            dash: None,
            cap: LineCap::Butt,
            glow: 0.0,
        }
    }

    /// With a dash pattern.
    #[must_use]
    pub const fn dashed(mut self, on: f32, off: f32) -> Self {
        self.dash = Some([on, off]);
        self
    }

    /// With round caps.
    #[must_use]
    pub const fn round(mut self) -> Self {
        self.cap = LineCap::Round;
        self
    }

    /// With a glow radius.
    #[must_use]
    pub const fn glow(mut self, glow: f32) -> Self {
        self.glow = glow;
        self
    }
}

/// Horizontal anchoring of text relative to its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    /// Position is the left edge.
    Left,
    /// Position is the centre.
    Center,
    /// Position is the right edge.
    Right,
}

/// Text run. Position is the baseline anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// Baseline anchor.
    pub pos: Vec2,
    /// Content.
    pub text: String,
    /// Font size in pixels.
    pub size: f32,
    /// Bold weight.
    pub bold: bool,
    /// Horizontal anchoring.
    pub align: TextAlign,
    /// Fill colour.
    pub paint: Paint,
    /// Glow radius; `0` for none.
    pub glow: f32,
}

/// One draw command.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    /// Replace every pixel with a colour.
    Clear(Rgba),
    /// Filled rectangle.
    FillRect(Rect, Paint),
    /// Outlined rectangle.
    StrokeRect(Rect, Stroke),
    /// Single segment.
    Line(Vec2, Vec2, Stroke),
    /// Open polyline.
    Polyline(Vec<Vec2>, Stroke),
    /// Open polyline coloured by a paint instead of the stroke colour.
    PaintedPolyline(Vec<Vec2>, Stroke, Paint),
    /// Closed filled polygon.
    FillPolygon(Vec<Vec2>, Paint),
    /// Circular arc, angles in radians, clockwise in screen space (y down).
    Arc {
        /// Centre.
        center: Vec2,
        /// Radius.
        radius: f32,
        /// Start angle.
        start: f32,
        /// End angle.
        end: f32,
        /// Outline style.
        stroke: Stroke,
    },
    /// Filled disc.
    FillCircle {
        /// Centre.
        center: Vec2,
        /// Radius.
        radius: f32,
        /// Fill.
        paint: Paint,
        /// Glow radius.
        glow: f32,
    },
    /// Circle outline.
    StrokeCircle {
        /// Centre.
        center: Vec2,
        /// Radius.
        radius: f32,
        /// Outline style.
        stroke: Stroke,
    },
    /// Text run.
    Text(TextRun),
}

/// Ordered command list for a `width × height` surface.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayList {
    width: f32,
    height: f32,
    cmds: Vec<DrawCmd>,
}

impl DisplayList {
    /// Empty list for a surface of the given size.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            cmds: Vec::new(),
        }
    }

    /// Surface width.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Surface height.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.height
    }

    /// The recorded commands in paint order.
    #[must_use]
    pub fn commands(&self) -> &[DrawCmd] {
        &self.cmds
    }

    /// Append a raw command.
    pub fn push(&mut self, cmd: DrawCmd) {
        self.cmds.push(cmd);
    }

    /// Fill the whole surface.
    pub fn clear(&mut self, color: Rgba) {
        self.push(DrawCmd::Clear(color));
    }

    /// Filled rectangle.
    pub fn fill_rect(&mut self, rect: Rect, paint: Paint) {
        self.push(DrawCmd::FillRect(rect, paint));
    }

    /// Outlined rectangle.
    pub fn stroke_rect(&mut self, rect: Rect, stroke: Stroke) {
        self.push(DrawCmd::StrokeRect(rect, stroke));
    }

    /// Single segment.
    pub fn line(&mut self, a: Vec2, b: Vec2, stroke: Stroke) {
        self.push(DrawCmd::Line(a, b, stroke));
    }

    /// Open polyline; fewer than two points draws nothing.
    pub fn polyline(&mut self, points: Vec<Vec2>, stroke: Stroke) {
        if points.len() >= 2 {
            self.push(DrawCmd::Polyline(points, stroke));
        }
    }

    /// Open polyline coloured by `paint`; fewer than two points draws
    /// nothing.
    pub fn painted_polyline(&mut self, points: Vec<Vec2>, stroke: Stroke, paint: Paint) {
        if points.len() >= 2 {
            self.push(DrawCmd::PaintedPolyline(points, stroke, paint));
        }
    }

    /// Filled polygon; fewer than three points draws nothing.
    pub fn fill_polygon(&mut self, points: Vec<Vec2>, paint: Paint) {
        if points.len() >= 3 {
            self.push(DrawCmd::FillPolygon(points, paint));
        }
    }

    /// Circular arc from `start` to `end` radians.
    pub fn arc(
        &mut self,
        center: Vec2,
        radius: f32,
        start: f32,
        end: f32,
        stroke: Stroke,
    ) {
        self.push(DrawCmd::Arc {
            center,
            radius,
            start,
            end,
            stroke,
        });
    }

    /// Filled disc.
    pub fn fill_circle(
        &mut self,
        center: Vec2,
        radius: f32,
        paint: Paint,
        glow: f32,
    ) {
        self.push(DrawCmd::FillCircle {
            center,
            radius,
            paint,
            glow,
        });
    }

    /// Circle outline.
    pub fn stroke_circle(&mut self, center: Vec2, radius: f32, stroke: Stroke) {
        self.push(DrawCmd::StrokeCircle {
            center,
            radius,
            stroke,
        });
    }

    /// Plain text in a solid colour.
    pub fn text(
        &mut self,
        pos: Vec2,
        text: impl Into<String>,
        size: f32,
        align: TextAlign,
        color: Rgba,
    ) {
        self.push(DrawCmd::Text(TextRun {
            pos,
            text: text.into(),
            size,
            bold: false,
            align,
            paint: Paint::Solid(color),
            glow: 0.0,
        }));
    }

    /// Fully specified text run.
    pub fn text_run(&mut self, run: TextRun) {
        self.push(DrawCmd::Text(run));
    }

    /// All text runs, in paint order.
    pub fn texts(&self) -> impl Iterator<Item = &TextRun> {
        self.cmds.iter().filter_map(|c| match c {
            DrawCmd::Text(run) => Some(run),
            _ => None,
        })
    }

    /// Whether any text run has exactly this content.
    #[must_use]
    pub fn has_text(&self, text: &str) -> bool {
        self.texts().any(|t| t.text == text)
    }

    /// Every point coordinate referenced by geometry commands. Used to check
    /// that nothing non-finite ever leaves a renderer.
    pub fn geometry_points(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.cmds.iter().flat_map(|c| -> Vec<Vec2> {
            match c {
                DrawCmd::Clear(_) => Vec::new(),
                DrawCmd::FillRect(r, _) | DrawCmd::StrokeRect(r, _) => {
                    vec![Vec2::new(r.x, r.y), Vec2::new(r.right(), r.bottom())]
                }
                DrawCmd::Line(a, b, _) => vec![*a, *b],
                DrawCmd::Polyline(pts, _)
                | DrawCmd::PaintedPolyline(pts, ..)
                | DrawCmd::FillPolygon(pts, _) => pts.clone(),
                DrawCmd::Arc { center, .. }
                | DrawCmd::FillCircle { center, .. }
                | DrawCmd::StrokeCircle { center, .. } => vec![*center],
                DrawCmd::Text(run) => vec![run.pos],
            }
        })
    }
}

/// `rgba(r, g, b, a)` from a `0xRRGGBB` literal and an alpha.
#[must_use]
pub fn rgba(hex: u32, alpha: f32) -> Rgba {
    crate::util::ramp::with_alpha(crate::util::ramp::hex_rgb(hex), alpha)
}
