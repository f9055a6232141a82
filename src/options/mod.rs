//! Centralized visualization options with TOML preset support.
//!
//! Every tunable constant of the reciprocal-space scene, the reflection
//! sampler, the playback cadence and the 2D panels lives here. Defaults
//! reproduce the reference look exactly; options serialize to/from TOML so
//! a session can be restyled without a rebuild.

mod animation;
mod camera;
mod display;
mod playback;
mod points;

use std::path::Path;

pub use animation::AnimationOptions;
pub use camera::CameraOptions;
pub use display::DisplayOptions;
pub use playback::PlaybackOptions;
pub use points::PointOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::XtalError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[playback]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Camera projection and orbit.
    pub camera: CameraOptions,
    /// Autonomous scene motion.
    pub animation: AnimationOptions,
    /// Reflection point sampling.
    pub points: PointOptions,
    /// Playback cadence.
    pub playback: PlaybackOptions,
    /// 2D panel layout.
    pub display: DisplayOptions,
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Parse options from TOML text. Missing fields use defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, XtalError> {
        toml::from_str(content)
            .map_err(|e| XtalError::OptionsParse(e.to_string()))
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, XtalError> {
        let content = std::fs::read_to_string(path).map_err(XtalError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), XtalError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| XtalError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(XtalError::Io)?;
        }
        std::fs::write(path, content).map_err(XtalError::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: Options = toml::from_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let opts = Options::from_toml_str(
            r"
[playback]
frame_interval_ms = 300
",
        )
        .unwrap();
        assert_eq!(opts.playback.frame_interval_ms, 300);
        assert_eq!(opts.points.max_points, 3000);
        assert_eq!(opts.camera.fovy, 50.0);
    }

    #[test]
    fn bad_toml_is_an_options_error() {
        let err = Options::from_toml_str("[points]\nmax_points = \"many\"")
            .unwrap_err();
        assert!(matches!(err, XtalError::OptionsParse(_)));
    }

    #[test]
    fn schema_has_expected_properties() {
        let schema_value =
            serde_json::to_value(Options::json_schema()).unwrap();
        let props = schema_value["properties"].as_object().unwrap();

        assert!(props.contains_key("camera"));
        assert!(props.contains_key("animation"));
        assert!(props.contains_key("points"));
        assert!(props.contains_key("playback"));
        assert!(props.contains_key("display"));

        let points = &props["points"]["properties"];
        assert!(points.get("max_points").is_some());
        assert!(points.get("base_radius").is_none());
    }
}
