use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Playback", inline)]
#[serde(default)]
/// Frame playback cadence.
pub struct PlaybackOptions {
    /// Milliseconds each frame stays on screen while playing.
    #[schemars(title = "Frame Interval (ms)", range(min = 16, max = 2000))]
    pub frame_interval_ms: u64,
    /// Start playing as soon as a dataset is loaded.
    #[schemars(title = "Autoplay")]
    pub autoplay: bool,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            frame_interval_ms: 150,
            autoplay: false,
        }
    }
}
