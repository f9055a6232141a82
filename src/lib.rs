// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Function signature hygiene
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]
// Tests assert on known-good fixtures
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! Live diagnostic visualization for a crystallography data-collection
//! session.
//!
//! Per-frame quality metrics drive three views: scrolling time series of
//! I/σ(I) and completeness, a radial R-merge gauge, and an animated 3D
//! reciprocal-space scene whose colour, glow and point density follow the
//! current frame's resolution shells.
//!
//! # Key entry points
//!
//! - [`metrics::MetricsDataset`] - the `metrics.json` data model
//! - [`dashboard::Dashboard`] - every panel, driven by the frame loop
//! - [`scheduler::FrameLoop`] - vsync-driven animation with a strict
//!   mount/unmount lifecycle
//! - [`scene::SceneAnimator`] - the 3D scene and its resource ledger
//! - [`renderer::SceneRenderer`] - the wgpu mirror of the scene
//! - [`options::Options`] - runtime configuration
//!
//! # Architecture
//!
//! Everything between the metrics and the pixels is a pure transform:
//! colour ramps, point sampling, chart layout and gauge geometry never
//! touch the GPU. Charts render into a retained [`chart::DisplayList`]
//! (rasterisable with [`chart::Rasterizer`]); the 3D scene is a
//! renderer-agnostic [`scene::SceneState`] whose geometry and materials
//! are tracked by id so the GPU side frees exactly what the scene
//! released.

pub mod camera;
pub mod chart;
pub mod dashboard;
pub mod error;
pub mod gpu;
pub mod ice;
pub mod input;
pub mod metrics;
pub mod options;
pub mod playback;
pub mod points;
pub mod renderer;
pub mod scene;
pub mod scheduler;
pub mod util;
#[cfg(feature = "viewer")]
mod viewer;
pub mod viewport;

pub use dashboard::{Dashboard, FrameInput};
pub use error::XtalError;
pub use input::{InputEvent, MouseButton};
pub use metrics::MetricsDataset;
pub use options::Options;
#[cfg(feature = "viewer")]
pub use viewer::{Viewer, ViewerBuilder};
