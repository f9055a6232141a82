use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Animation", inline)]
#[serde(default)]
/// Rates and amplitudes of the autonomous scene motion.
///
/// Rates are radians per second of wall-clock time unless noted.
pub struct AnimationOptions {
    /// Lattice yaw added per tick while playing (radians per tick).
    #[schemars(title = "Lattice Spin", range(min = 0.0, max = 0.02), extend("step" = 0.001))]
    pub lattice_spin_per_tick: f32,
    /// Lattice pitch wobble rate.
    #[schemars(skip)]
    pub lattice_wobble_rate: f32,
    /// Lattice pitch wobble amplitude in radians.
    #[schemars(skip)]
    pub lattice_wobble: f32,
    /// Energy field spin rates about x and y.
    #[schemars(skip)]
    pub energy_spin: [f32; 2],
    /// Energy field breathing rate.
    #[schemars(title = "Breathe Rate", range(min = 0.0, max = 5.0), extend("step" = 0.1))]
    pub breathe_rate: f32,
    /// Energy field breathing amplitude as a fraction of unit scale.
    #[schemars(title = "Breathe Amplitude", range(min = 0.0, max = 0.2), extend("step" = 0.01))]
    pub breathe_amplitude: f32,
    /// Wireframe shell spin rates about x and y.
    #[schemars(skip)]
    pub wireframe_spin: [f32; 2],
    /// Point-cloud opacity pulse rate.
    #[schemars(title = "Pulse Rate", range(min = 0.0, max = 5.0), extend("step" = 0.1))]
    pub pulse_rate: f32,
    /// Phase offset between consecutive clouds' pulses.
    #[schemars(skip)]
    pub pulse_phase_step: f32,
    /// Pulse swing around `pulse_center`.
    #[schemars(skip)]
    pub pulse_amplitude: f32,
    /// Mean opacity factor of the pulse.
    #[schemars(skip)]
    pub pulse_center: f32,
    /// Cloud yaw rate multiplied by `(index + 1)`.
    #[schemars(skip)]
    pub cloud_spin: f32,
    /// Cloud pitch wobble rate.
    #[schemars(skip)]
    pub cloud_wobble_rate: f32,
    /// Cloud pitch wobble amplitude in radians.
    #[schemars(skip)]
    pub cloud_wobble: f32,
}

impl Default for AnimationOptions {
    fn default() -> Self {
        Self {
            lattice_spin_per_tick: 0.003,
            lattice_wobble_rate: 0.2,
            lattice_wobble: 0.05,
            energy_spin: [0.15, 0.25],
            breathe_rate: 1.2,
            breathe_amplitude: 0.03,
            wireframe_spin: [-0.1, 0.2],
            pulse_rate: 1.5,
            pulse_phase_step: 0.3,
            pulse_amplitude: 0.2,
            pulse_center: 0.8,
            cloud_spin: 0.08,
            cloud_wobble_rate: 0.25,
            cloud_wobble: 0.08,
        }
    }
}
