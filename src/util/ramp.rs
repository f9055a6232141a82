//! Piecewise-linear value ramps keyed by scalar breakpoints.
//!
//! A [`Ramp`] is an ordered list of `(bound, value)` stops. Sampling below
//! the first bound yields the first value, sampling at or above the last
//! bound yields the last value, and anything in between interpolates
//! linearly between the two enclosing stops. Two stops sharing a bound form
//! a hard step, which is how the flat bands and the glow discontinuities
//! below are expressed.
//!
//! Every palette used by the reciprocal-space view lives here so that
//! background, energy field, wireframe and reflection colours share one set
//! of semantics.

/// Linear RGB triple in `[0, 1]`.
pub type Rgb = [f32; 3];

/// RGBA quadruple in `[0, 1]`.
pub type Rgba = [f32; 4];

/// Values a [`Ramp`] can blend between.
pub trait Lerp: Copy {
    /// Blend `a` towards `b` by `t` (`t = 0` is `a`, `t = 1` is `b`).
    fn lerp(a: Self, b: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    #[inline]
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        a + (b - a) * t
    }
}

impl<const N: usize> Lerp for [f32; N] {
    #[inline]
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        let mut out = a;
        for (o, (x, y)) in out.iter_mut().zip(a.iter().zip(b.iter())) {
            *o = x + (y - x) * t;
        }
        out
    }
}

/// A single breakpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stop<T> {
    /// Scalar position of the stop.
    pub bound: f32,
    /// Value produced exactly at `bound`.
    pub value: T,
}

/// Ordered piecewise-linear ramp. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Ramp<T> {
    stops: Vec<Stop<T>>,
}

impl<T: Lerp> Ramp<T> {
    /// Build a ramp from a first stop plus any number of further stops.
    ///
    /// Stops are stably sorted by bound, so stops that share a bound keep
    /// their relative order and form a step.
    pub fn new(
        first: (f32, T),
        rest: impl IntoIterator<Item = (f32, T)>,
    ) -> Self {
        let mut stops: Vec<Stop<T>> = std::iter::once(first)
            .chain(rest)
            .map(|(bound, value)| Stop { bound, value })
            .collect();
        stops.sort_by(|a, b| a.bound.total_cmp(&b.bound));
        Self { stops }
    }

    /// Flat bands with no interpolation: each `(upper, value)` applies to
    /// samples below `upper`, and `top` applies at or above the last upper
    /// bound.
    pub fn stepped(first: (f32, T), bands: &[(f32, T)], top: T) -> Self {
        let mut stops = vec![first];
        let mut prev_upper = first.0;
        for &(upper, value) in bands {
            stops.push((prev_upper, value));
            stops.push((upper, value));
            prev_upper = upper;
        }
        stops.push((prev_upper, top));
        let mut iter = stops.into_iter();
        let head = iter.next().unwrap_or(first);
        Self::new(head, iter)
    }

    /// Sample the ramp. Total over all inputs: NaN and `-inf` resolve to the
    /// first stop, `+inf` to the last.
    pub fn sample(&self, value: f32) -> T {
        let value = if value.is_nan() { f32::NEG_INFINITY } else { value };

        let first = self.stops[0];
        if value < first.bound {
            return first.value;
        }
        let last = self.stops[self.stops.len() - 1];
        if value >= last.bound {
            return last.value;
        }

        for pair in self.stops.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if lo.bound <= value && value < hi.bound {
                let t = (value - lo.bound) / (hi.bound - lo.bound);
                return T::lerp(lo.value, hi.value, t);
            }
        }
        last.value
    }

    /// The stops, in ascending bound order.
    pub fn stops(&self) -> &[Stop<T>] {
        &self.stops
    }
}

/// Decode a `0xRRGGBB` literal into an [`Rgb`] triple.
#[must_use]
pub fn hex_rgb(hex: u32) -> Rgb {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

/// Attach an alpha channel to an [`Rgb`] triple.
#[must_use]
pub fn with_alpha(rgb: Rgb, alpha: f32) -> Rgba {
    [rgb[0], rgb[1], rgb[2], alpha]
}

/// Scene background tint keyed by average I/σ.
///
/// Dark red below 10, warming through amber and olive to teal by 25, then a
/// deep blue from 25 up.
#[must_use]
pub fn background_ramp() -> Ramp<Rgb> {
    Ramp::new(
        (10.0, hex_rgb(0x0a_0000)),
        [
            (15.0, hex_rgb(0x0a_0500)),
            (20.0, hex_rgb(0x05_0a00)),
            (25.0, hex_rgb(0x00_0a0a)),
            (25.0, hex_rgb(0x00_050a)),
        ],
    )
}

/// Energy-field colour keyed by average I/σ.
#[must_use]
pub fn energy_color_ramp() -> Ramp<Rgb> {
    Ramp::new(
        (10.0, hex_rgb(0xff_0033)),
        [
            (15.0, hex_rgb(0xff_6600)),
            (20.0, hex_rgb(0xff_cc00)),
            (25.0, hex_rgb(0x00_ffff)),
            (35.0, hex_rgb(0x00_66ff)),
        ],
    )
}

/// Energy-field glow (emissive intensity) keyed by average I/σ.
///
/// Each band restarts lower than where the previous one ended, so weak data
/// glows hardest.
#[must_use]
pub fn energy_glow_ramp() -> Ramp<f32> {
    Ramp::new(
        (10.0, 0.25),
        [
            (10.0, 0.20),
            (15.0, 0.25),
            (15.0, 0.15),
            (20.0, 0.20),
            (20.0, 0.12),
            (25.0, 0.15),
            (25.0, 0.10),
            (35.0, 0.15),
        ],
    )
}

/// Wireframe shell tint: three flat bands keyed by average I/σ.
#[must_use]
pub fn wireframe_ramp() -> Ramp<Rgb> {
    Ramp::stepped(
        (15.0, hex_rgb(0xff_3366)),
        &[(25.0, hex_rgb(0xff_aa00))],
        hex_rgb(0x00_ddff),
    )
}

/// Reflection point colour keyed by I/σ normalised into `[0, 1]`.
///
/// Red/orange for weak signal, yellow/green in the middle, cyan/blue for
/// strong signal.
#[must_use]
pub fn reflection_ramp() -> Ramp<Rgb> {
    Ramp::new(
        (0.0, [1.0, 0.0, 0.0]),
        [
            (0.3, [1.0, 0.45, 0.15]),
            (0.3, [1.0, 0.45, 0.0]),
            (0.5, [1.0, 1.0, 0.3]),
            (0.7, [0.2, 1.0, 1.0]),
            (1.0, [0.0, 0.6, 1.0]),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Rgb, b: Rgb) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn outside_the_stops_returns_boundary_values_exactly() {
        let ramp = energy_color_ramp();
        assert_eq!(ramp.sample(0.0), hex_rgb(0xff0033));
        assert_eq!(ramp.sample(9.999), hex_rgb(0xff0033));
        assert_eq!(ramp.sample(35.0), hex_rgb(0x0066ff));
        assert_eq!(ramp.sample(1e9), hex_rgb(0x0066ff));
        assert_eq!(ramp.sample(f32::INFINITY), hex_rgb(0x0066ff));
    }

    #[test]
    fn interpolates_inside_a_band() {
        let ramp = energy_color_ramp();
        let mid = ramp.sample(12.5);
        let a = hex_rgb(0xff0033);
        let b = hex_rgb(0xff6600);
        let expected = [
            (a[0] + b[0]) / 2.0,
            (a[1] + b[1]) / 2.0,
            (a[2] + b[2]) / 2.0,
        ];
        assert!(close(mid, expected));
    }

    #[test]
    fn shared_bound_forms_a_step() {
        let bg = background_ramp();
        assert!(close(bg.sample(24.999), hex_rgb(0x000a0a)));
        assert_eq!(bg.sample(25.0), hex_rgb(0x00050a));
        assert_eq!(bg.sample(40.0), hex_rgb(0x00050a));
    }

    #[test]
    fn glow_restarts_each_band() {
        let glow = energy_glow_ramp();
        assert_eq!(glow.sample(5.0), 0.25);
        assert!((glow.sample(10.0) - 0.20).abs() < 1e-6);
        assert!((glow.sample(12.5) - 0.225).abs() < 1e-6);
        assert!((glow.sample(15.0) - 0.15).abs() < 1e-6);
        assert!((glow.sample(22.5) - 0.135).abs() < 1e-6);
        assert!((glow.sample(30.0) - 0.125).abs() < 1e-6);
        assert_eq!(glow.sample(100.0), 0.15);
    }

    #[test]
    fn wireframe_bands_are_flat() {
        let wire = wireframe_ramp();
        assert_eq!(wire.sample(0.0), hex_rgb(0xff3366));
        assert_eq!(wire.sample(14.9), hex_rgb(0xff3366));
        assert_eq!(wire.sample(15.0), hex_rgb(0xffaa00));
        assert_eq!(wire.sample(24.9), hex_rgb(0xffaa00));
        assert_eq!(wire.sample(25.0), hex_rgb(0x00ddff));
    }

    #[test]
    fn reflection_bands_match_piecewise_formulas() {
        let ramp = reflection_ramp();
        let i = 0.2;
        assert!(close(ramp.sample(i), [1.0, i * 1.5, i * 0.5]));
        // second band restarts its blue channel at zero
        assert!(close(ramp.sample(0.3), [1.0, 0.45, 0.0]));
        let t: f32 = 0.5;
        assert!(close(ramp.sample(0.6), [1.0 - t * 0.8, 1.0, 0.3 + t * 0.7]));
        assert!(close(ramp.sample(1.0), [0.0, 0.6, 1.0]));
    }

    #[test]
    fn nan_is_total() {
        let ramp = background_ramp();
        assert_eq!(ramp.sample(f32::NAN), hex_rgb(0x0a0000));
    }

    #[test]
    fn stops_are_sorted_on_construction() {
        let ramp = Ramp::new((5.0, 1.0_f32), [(0.0, 0.0)]);
        assert_eq!(ramp.stops()[0].bound, 0.0);
        assert!((ramp.sample(2.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn hex_decodes_channels() {
        assert_eq!(hex_rgb(0xff0000), [1.0, 0.0, 0.0]);
        assert_eq!(hex_rgb(0x0000ff), [0.0, 0.0, 1.0]);
    }
}
