use std::sync::Arc;

use glam::Vec3;
use rand::Rng;

use super::{
    default_energy_material, default_lights, default_wireframe_material, PointCloud,
    ResourceKind, ResourcePool, SceneState, Transform, DEFAULT_BACKGROUND,
};
use crate::metrics::{ResolutionShell, ShellSummary};
use crate::options::{AnimationOptions, Options, PointOptions};
use crate::points;
use crate::scheduler::FrameClock;
use crate::util::ramp::{
    background_ramp, energy_color_ramp, energy_glow_ramp, wireframe_ramp,
};

/// Owns a [`SceneState`] and advances it.
///
/// `tick` and `update` touch disjoint properties apart from cloud opacity,
/// which `update` seeds and `tick` modulates, so neither channel has to wait
/// for the other.
#[derive(Debug)]
pub struct SceneAnimator {
    state: SceneState,
    animation: AnimationOptions,
    points: PointOptions,
    disposed: bool,
}

impl SceneAnimator {
    /// Build the scene for a `width` × `height` surface.
    #[must_use]
    pub fn create(options: &Options, width: u32, height: u32) -> Self {
        log::debug!("creating scene {width}x{height}");
        let mut state = SceneState::new(&options.camera, width, height);
        state.show_grid = options.display.show_grid;
        Self {
            state,
            animation: options.animation.clone(),
            points: options.points,
            disposed: false,
        }
    }

    /// The scene.
    #[must_use]
    pub fn state(&self) -> &SceneState {
        &self.state
    }

    /// Mutable access to the resource pool, for attaching a mirror and
    /// draining releases.
    pub fn pool_mut(&mut self) -> &mut ResourcePool {
        &mut self.state.pool
    }

    /// Whether [`SceneAnimator::dispose`] has run.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Replace all data-derived appearance for a new frame's shells.
    ///
    /// The previous point clouds are released before new ones are created.
    /// An empty shell list leaves no clouds and restores the creation-time
    /// look.
    pub fn update<R: Rng + ?Sized>(&mut self, shells: &[ResolutionShell], rng: &mut R) {
        if self.disposed {
            return;
        }
        self.state.release_clouds();
        self.state.summary = ShellSummary::from_shells(shells);

        let Some(summary) = self.state.summary else {
            self.reset_appearance();
            return;
        };

        let avg = finite_or_zero(summary.avg_i_over_sigma);
        let intensity = finite_or_zero(summary.intensity_normalized());
        let completeness = finite_or_zero(summary.completeness_normalized());

        let state = &mut self.state;
        state.background = background_ramp().sample(avg);

        let color = energy_color_ramp().sample(avg);
        let glow = energy_glow_ramp().sample(avg);
        let energy = &mut state.energy_field.material;
        energy.color = color;
        energy.emissive = color;
        energy.emissive_intensity = glow;
        energy.opacity = 0.02 + glow * 0.15;

        let wire = &mut state.wireframe.material;
        wire.color = wireframe_ramp().sample(avg);
        wire.opacity = 0.08 + completeness * 0.12;

        state.lights[0].intensity = 2.5 + intensity * 2.0;
        state.lights[1].intensity = 1.5 + intensity * 1.5;
        state.lights[2].intensity = 1.5 + completeness * 1.5;

        state.lattice.apply(intensity, completeness);

        for cloud in points::generate_all(shells, &self.points, rng) {
            let geometry_id = state.pool.acquire(ResourceKind::Geometry);
            let material_id = state.pool.acquire(ResourceKind::Material);
            state.clouds.push(PointCloud {
                data: Arc::new(cloud),
                geometry_id,
                material_id,
                base_opacity: 1.0,
                opacity: 1.0,
                transform: Transform::default(),
            });
        }
        log::debug!(
            "scene update: {} shells, {} points",
            shells.len(),
            state.point_total()
        );
    }

    fn reset_appearance(&mut self) {
        let state = &mut self.state;
        state.background = DEFAULT_BACKGROUND;
        state.energy_field.material = default_energy_material();
        state.wireframe.material = default_wireframe_material();
        let defaults = default_lights();
        for (light, default) in state.lights.iter_mut().zip(defaults) {
            light.intensity = default.intensity;
        }
        state.lattice.reset();
    }

    /// One animation step.
    ///
    /// Rotations and the camera orbit advance only while playing. The
    /// energy-field breathing and cloud opacity pulse always run.
    pub fn tick(&mut self, clock: &FrameClock) {
        if self.disposed {
            return;
        }
        let t = clock.time;
        let a = &self.animation;
        let state = &mut self.state;

        if clock.playing {
            let lattice = &mut state.lattice;
            lattice.angles.y += a.lattice_spin_per_tick;
            lattice.angles.x = (t * a.lattice_wobble_rate).sin() * a.lattice_wobble;
            lattice.transform.set_euler(lattice.angles);

            state.energy_angles = Vec3::new(t * a.energy_spin[0], t * a.energy_spin[1], 0.0);
            state.energy_field.transform.set_euler(state.energy_angles);

            state.wireframe_angles =
                Vec3::new(t * a.wireframe_spin[0], t * a.wireframe_spin[1], 0.0);
            state.wireframe.transform.set_euler(state.wireframe_angles);

            for (i, cloud) in state.clouds.iter_mut().enumerate() {
                let i = i as f32;
                let angles = Vec3::new(
                    (t * a.cloud_wobble_rate + i).sin() * a.cloud_wobble,
                    t * a.cloud_spin * (i + 1.0),
                    0.0,
                );
                cloud.transform.set_euler(angles);
            }

            state.camera.eye = state.orbit.eye_at(t);
            state.camera.target = Vec3::ZERO;
        }

        let breathe = 1.0 + (t * a.breathe_rate).sin() * a.breathe_amplitude;
        state.energy_field.transform.scale = Vec3::splat(breathe);

        for (i, cloud) in state.clouds.iter_mut().enumerate() {
            let pulse = (t * a.pulse_rate + i as f32 * a.pulse_phase_step).sin()
                * a.pulse_amplitude
                + a.pulse_center;
            cloud.opacity = cloud.base_opacity * pulse;
        }
    }

    /// Track a new surface size. Zero-sized surfaces are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || self.state.viewport == (width, height) {
            return;
        }
        self.state.viewport = (width, height);
        self.state.camera.set_viewport(width, height);
    }

    /// Release every resource. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.state.release_all();
        self.disposed = true;
        log::debug!("scene disposed");
    }
}

impl Drop for SceneAnimator {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn finite_or_zero(v: f32) -> f32 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::metrics::tests::shell;
    use crate::util::ramp::hex_rgb;

    fn shells() -> Vec<ResolutionShell> {
        vec![
            shell(4.0, 24.0, 99.0, 900),
            shell(3.0, 18.0, 96.0, 600),
            shell(2.0, 8.0, 88.0, 300),
        ]
    }

    fn clock(time: f32, playing: bool) -> FrameClock {
        FrameClock {
            time,
            dt: 0.016,
            playing,
        }
    }

    fn animator() -> SceneAnimator {
        SceneAnimator::create(&Options::default(), 800, 600)
    }

    #[test]
    fn repeated_updates_do_not_leak() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut anim = animator();
        anim.pool_mut().attach_mirror();
        let baseline = anim.state().pool.live_count();
        for _ in 0..50 {
            anim.update(&shells(), &mut rng);
            assert_eq!(anim.state().clouds.len(), 3);
            assert_eq!(anim.state().pool.live_count(), baseline + 6);
        }
        let released = anim.pool_mut().drain_released();
        assert_eq!(released.len(), 49 * 6);
    }

    #[test]
    fn clouds_follow_the_shells() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut anim = animator();
        anim.update(&shells(), &mut rng);
        let counts: Vec<_> = anim.state().clouds.iter().map(|c| c.data.len()).collect();
        assert_eq!(counts, vec![300, 200, 100]);
        let summary = anim.state().summary.unwrap();
        assert!((summary.avg_i_over_sigma - 50.0 / 3.0).abs() < 1e-4);
    }

    #[test]
    fn data_update_drives_materials() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut anim = animator();
        anim.update(&[shell(2.0, 30.0, 100.0, 30)], &mut rng);
        let s = anim.state();
        assert_eq!(s.lights[0].intensity, 4.5);
        assert_eq!(s.lights[2].intensity, 3.0);
        assert_eq!(s.wireframe.material.color, hex_rgb(0x00ddff));
        assert!((s.wireframe.material.opacity - 0.2).abs() < 1e-6);
        let energy = &s.energy_field.material;
        assert_eq!(energy.color, energy.emissive);
        assert!((energy.opacity - (0.02 + energy.emissive_intensity * 0.15)).abs() < 1e-6);
    }

    #[test]
    fn empty_shells_reset_the_scene() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut anim = animator();
        let fresh_energy = anim.state().energy_field.material;
        let fresh_lights = anim.state().lights;
        anim.update(&shells(), &mut rng);
        anim.update(&[], &mut rng);
        let s = anim.state();
        assert!(s.clouds.is_empty());
        assert!(s.summary.is_none());
        assert_eq!(s.energy_field.material, fresh_energy);
        assert_eq!(s.lights, fresh_lights);
        assert_eq!(s.background, [0.0; 3]);
        assert_eq!(s.lattice.edges[0].material.opacity, 0.25);
    }

    #[test]
    fn paused_freezes_angles_but_keeps_pulsing() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut anim = animator();
        anim.update(&shells(), &mut rng);
        anim.tick(&clock(1.0, true));
        let angles = anim.state().lattice.angles;
        let eye = anim.state().camera.eye;
        let wire = anim.state().wireframe.transform.rotation;

        anim.tick(&clock(2.0, false));
        let s = anim.state();
        assert_eq!(s.lattice.angles, angles);
        assert_eq!(s.camera.eye, eye);
        assert_eq!(s.wireframe.transform.rotation, wire);
        let expected_scale = 1.0 + (2.0_f32 * 1.2).sin() * 0.03;
        assert!((s.energy_field.transform.scale.x - expected_scale).abs() < 1e-6);
        let expected = (2.0_f32 * 1.5 + 0.3).sin() * 0.2 + 0.8;
        assert!((s.clouds[1].opacity - expected).abs() < 1e-6);
    }

    #[test]
    fn playing_orbits_the_camera() {
        let mut anim = animator();
        anim.tick(&clock(0.0, true));
        assert_eq!(anim.state().camera.eye, Vec3::new(32.0, 20.0, 0.0));
        anim.tick(&clock(0.0, true));
        assert!((anim.state().lattice.angles.y - 0.006).abs() < 1e-7);
    }

    #[test]
    fn dispose_releases_everything_once() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut anim = animator();
        anim.pool_mut().attach_mirror();
        anim.update(&shells(), &mut rng);
        anim.dispose();
        assert_eq!(anim.state().pool.live_count(), 0);
        let total = anim.state().pool.acquired_total() as usize;
        assert_eq!(anim.pool_mut().drain_released().len(), total);
        anim.dispose();
        assert!(anim.pool_mut().drain_released().is_empty());
        anim.update(&shells(), &mut rng);
        assert!(anim.state().clouds.is_empty());
    }

    #[test]
    fn resize_ignores_zero_and_repeats() {
        let mut anim = animator();
        anim.resize(0, 100);
        assert_eq!(anim.state().viewport, (800, 600));
        anim.resize(1000, 500);
        assert_eq!(anim.state().camera.aspect, 2.0);
    }
}
