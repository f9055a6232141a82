//! 2D diagnostic panels: metric time series, r-merge gauge, the per-shell
//! bar chart and the resolution ring overlay.
//!
//! Each renderer is a pure function from metrics to a [`DisplayList`].

pub mod canvas;
pub mod gauge;
pub mod raster;
pub mod rings;
pub mod shells;
pub mod timeseries;

pub use canvas::{DisplayList, DrawCmd, Paint, Rect, Stroke, TextAlign};
pub use gauge::{FrameReadings, GaugeInput, GaugeReadout};
pub use raster::Rasterizer;
pub use timeseries::SeriesStyle;
