//! Reflection point clouds, one per resolution shell.
//!
//! Points are scattered uniformly over a sphere whose radius grows with the
//! shell index, so outer (higher-resolution) shells sit farther out in
//! reciprocal space. Colour comes from the shell's aggregate I/σ: every point
//! of a shell shares it.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

use crate::metrics::ResolutionShell;
use crate::options::PointOptions;
use crate::util::ramp::{reflection_ramp, Rgb};

/// Generated geometry for one shell.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloudData {
    /// Index of the shell within its frame.
    pub shell_index: usize,
    /// Sphere radius every point lies on.
    pub radius: f32,
    /// Point positions.
    pub positions: Vec<Vec3>,
    /// Per-point colours (uniform within a shell).
    pub colors: Vec<Rgb>,
    /// Rendered point size.
    pub point_size: f32,
}

impl PointCloudData {
    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the cloud has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Positions flattened to `[x0, y0, z0, x1, ...]`.
    #[must_use]
    pub fn flat_positions(&self) -> Vec<f32> {
        self.positions.iter().flat_map(|p| p.to_array()).collect()
    }
}

/// Number of points drawn for a shell: one per `density_divisor`
/// reflections, capped at `max_points`.
#[must_use]
pub fn point_count(shell: &ResolutionShell, params: &PointOptions) -> usize {
    let divisor = params.density_divisor.max(1);
    (shell.n_reflections / divisor).min(params.max_points) as usize
}

/// Sphere radius for the shell at `index`.
#[must_use]
pub fn shell_radius(index: usize, params: &PointOptions) -> f32 {
    params.base_radius + index as f32 * params.shell_spacing
}

/// Colour shared by every point of a shell.
#[must_use]
pub fn shell_color(shell: &ResolutionShell, params: &PointOptions) -> Rgb {
    let ceiling = if params.i_over_sigma_ceiling > 0.0 {
        params.i_over_sigma_ceiling
    } else {
        1.0
    };
    let normalized = (shell.i_over_sigma / ceiling).clamp(0.0, 1.0);
    reflection_ramp().sample(normalized)
}

/// Rendered point size for a shell.
#[must_use]
pub fn point_size(shell: &ResolutionShell, params: &PointOptions) -> f32 {
    let ios = if shell.i_over_sigma.is_finite() {
        shell.i_over_sigma.max(0.0)
    } else {
        0.0
    };
    params.base_size + (ios / 30.0) * params.size_gain
}

/// Uniform sample on the sphere of radius `r`.
///
/// The polar angle comes from `acos(2u - 1)` rather than a uniform angle so
/// points do not bunch up at the poles.
fn sample_sphere<R: Rng + ?Sized>(rng: &mut R, r: f32) -> Vec3 {
    let theta = rng.random::<f32>() * TAU;
    let phi = (2.0 * rng.random::<f32>() - 1.0).clamp(-1.0, 1.0).acos();
    let (sin_phi, cos_phi) = phi.sin_cos();
    let (sin_theta, cos_theta) = theta.sin_cos();
    Vec3::new(r * sin_phi * cos_theta, r * sin_phi * sin_theta, r * cos_phi)
}

/// Build the point cloud for `shell` at position `index` in its frame.
pub fn generate_points<R: Rng + ?Sized>(
    shell: &ResolutionShell,
    index: usize,
    params: &PointOptions,
    rng: &mut R,
) -> PointCloudData {
    let count = point_count(shell, params);
    let radius = shell_radius(index, params);
    let color = shell_color(shell, params);

    let positions = (0..count).map(|_| sample_sphere(rng, radius)).collect();

    PointCloudData {
        shell_index: index,
        radius,
        positions,
        colors: vec![color; count],
        point_size: point_size(shell, params),
    }
}

/// Build one cloud per shell, in shell order.
pub fn generate_all<R: Rng + ?Sized>(
    shells: &[ResolutionShell],
    params: &PointOptions,
    rng: &mut R,
) -> Vec<PointCloudData> {
    shells
        .iter()
        .enumerate()
        .map(|(i, shell)| generate_points(shell, i, params, rng))
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::metrics::tests::shell;

    #[test]
    fn count_is_capped_density() {
        let p = PointOptions::default();
        assert_eq!(point_count(&shell(2.0, 10.0, 90.0, 0), &p), 0);
        assert_eq!(point_count(&shell(2.0, 10.0, 90.0, 2), &p), 0);
        assert_eq!(point_count(&shell(2.0, 10.0, 90.0, 3001), &p), 1000);
        assert_eq!(point_count(&shell(2.0, 10.0, 90.0, 9000), &p), 3000);
        assert_eq!(point_count(&shell(2.0, 10.0, 90.0, 90_000), &p), 3000);
    }

    #[test]
    fn positions_lie_on_the_shell_sphere() {
        let p = PointOptions::default();
        let mut rng = StdRng::seed_from_u64(7);
        for (index, n) in [(0_usize, 300_u32), (3, 1500), (9, 12_000)] {
            let s = shell(2.0, 18.0, 95.0, n);
            let cloud = generate_points(&s, index, &p, &mut rng);
            assert_eq!(cloud.flat_positions().len(), 3 * point_count(&s, &p));
            let r = 6.0 + index as f32 * 2.5;
            for pos in &cloud.positions {
                assert!((pos.length() - r).abs() < 1e-3 * r);
            }
        }
    }

    #[test]
    fn color_and_size_follow_shell_intensity() {
        let p = PointOptions::default();
        let mut rng = StdRng::seed_from_u64(1);
        let s = shell(3.0, 35.0, 99.0, 60);
        let cloud = generate_points(&s, 0, &p, &mut rng);
        assert!(cloud.colors.iter().all(|c| *c == [0.0, 0.6, 1.0]));
        assert!((cloud.point_size - (1.6 + 35.0 / 30.0 * 0.8)).abs() < 1e-6);

        let weak = shell(3.0, 0.0, 99.0, 60);
        assert_eq!(shell_color(&weak, &p), [1.0, 0.0, 0.0]);
    }

    #[test]
    fn regeneration_keeps_counts_colors_and_radii() {
        let p = PointOptions::default();
        let shells = [
            shell(8.0, 30.0, 99.0, 4000),
            shell(4.0, 12.0, 97.0, 2400),
            shell(2.0, 1.5, 80.0, 9600),
        ];
        let mut rng = StdRng::seed_from_u64(42);
        let first = generate_all(&shells, &p, &mut rng);
        let second = generate_all(&shells, &p, &mut rng);
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.len(), b.len());
            assert_eq!(a.colors, b.colors);
            assert_eq!(a.point_size, b.point_size);
            assert_eq!(a.radius, b.radius);
        }
    }

    #[test]
    fn no_shells_no_clouds() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(generate_all(&[], &PointOptions::default(), &mut rng).is_empty());
    }
}
