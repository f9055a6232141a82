use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Display", inline)]
#[serde(default)]
/// Canvas sizes and thresholds for the 2D panels.
pub struct DisplayOptions {
    /// Time-series canvas size in pixels.
    #[schemars(skip)]
    pub chart_size: [u32; 2],
    /// Gauge canvas size in pixels (square).
    #[schemars(skip)]
    pub gauge_size: u32,
    /// Resolution shell bar chart size in pixels.
    #[schemars(skip)]
    pub shell_chart_size: [u32; 2],
    /// Resolution ring overlay size in pixels (square, matches the image).
    #[schemars(skip)]
    pub ring_overlay_size: u32,
    /// Threshold drawn on the I/σ chart.
    #[schemars(title = "I/σ Threshold", range(min = 0.0, max = 50.0), extend("step" = 0.5))]
    pub i_over_sigma_threshold: f32,
    /// Threshold drawn on the completeness chart.
    #[schemars(title = "Completeness Threshold", range(min = 0.0, max = 100.0), extend("step" = 0.5))]
    pub completeness_threshold: f32,
    /// Draw the ground grid.
    #[schemars(title = "Show Grid")]
    pub show_grid: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            chart_size: [400, 180],
            gauge_size: 400,
            shell_chart_size: [400, 200],
            ring_overlay_size: 1024,
            i_over_sigma_threshold: 15.0,
            completeness_threshold: 95.0,
            show_grid: true,
        }
    }
}
