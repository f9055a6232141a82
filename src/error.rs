//! Crate-level error types.

use std::fmt;

use crate::gpu::render_context::RenderContextError;

/// Errors produced by the xtalview crate.
///
/// None of these reach the visualization core at frame time: the pure
/// transforms are total, and upstream failures (ice analysis) are folded into
/// fallback records before they get near a renderer.
#[derive(Debug)]
pub enum XtalError {
    /// GPU context initialization failure.
    Gpu(RenderContextError),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// Metrics JSON could not be decoded.
    MetricsParse(String),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Viewer event-loop failure.
    Viewer(String),
    /// The animation loop was mounted a second time.
    LoopAlreadyMounted,
}

impl fmt::Display for XtalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::MetricsParse(msg) => {
                write!(f, "metrics parse error: {msg}")
            }
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Viewer(msg) => write!(f, "viewer error: {msg}"),
            Self::LoopAlreadyMounted => {
                write!(f, "animation loop is already mounted")
            }
        }
    }
}

impl std::error::Error for XtalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpu(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RenderContextError> for XtalError {
    fn from(e: RenderContextError) -> Self {
        Self::Gpu(e)
    }
}

impl From<std::io::Error> for XtalError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for XtalError {
    fn from(e: serde_json::Error) -> Self {
        Self::MetricsParse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_failure() {
        let err = XtalError::MetricsParse("missing field `frames`".to_owned());
        assert_eq!(
            err.to_string(),
            "metrics parse error: missing field `frames`"
        );
        assert_eq!(
            XtalError::LoopAlreadyMounted.to_string(),
            "animation loop is already mounted"
        );
    }

    #[test]
    fn io_errors_keep_their_source() {
        use std::error::Error;
        let err: XtalError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(err.source().is_some());
    }
}
