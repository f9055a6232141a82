//! Ice-ring contamination records.
//!
//! The analysis itself runs in an external backend. This module only holds
//! the reply shape and folds every failure into a fixed fallback record so
//! that a failed fetch degrades to a placeholder card instead of an error.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::util::ramp::{hex_rgb, Rgb};

/// A single detected ice ring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IceRing {
    /// Ring resolution in Å.
    pub resolution: f32,
    /// Contamination percentage attributed to this ring.
    pub contamination_level: f32,
}

/// Severity bucket of one ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingSeverity {
    /// `<= 10%`
    Minor,
    /// `10% ..= 30%`
    Moderate,
    /// `> 30%`
    Severe,
}

impl RingSeverity {
    /// Lowercase label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Minor => "minor",
            Self::Moderate => "moderate",
            Self::Severe => "severe",
        }
    }
}

impl IceRing {
    /// Classify by contamination level.
    #[must_use]
    pub fn severity(&self) -> RingSeverity {
        if self.contamination_level > 30.0 {
            RingSeverity::Severe
        } else if self.contamination_level > 10.0 {
            RingSeverity::Moderate
        } else {
            RingSeverity::Minor
        }
    }
}

/// Overall contamination verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IceStatus {
    /// `< 10%`
    Clean,
    /// `10% ..< 30%`
    Warning,
    /// `>= 30%`
    Contaminated,
}

impl IceStatus {
    /// Classify a maximum contamination percentage.
    #[must_use]
    pub fn of(max_contamination: f32) -> Self {
        if max_contamination < 10.0 {
            Self::Clean
        } else if max_contamination < 30.0 {
            Self::Warning
        } else {
            Self::Contaminated
        }
    }

    /// Upper-case label as the backend reports it.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Clean => "CLEAN",
            Self::Warning => "WARNING",
            Self::Contaminated => "CONTAMINATED",
        }
    }

    /// Suggested action for the operator.
    #[must_use]
    pub fn recommendation(self) -> &'static str {
        match self {
            Self::Clean => "No ice detected. Data quality adequate.",
            Self::Warning => {
                "Minor ice contamination detected. Monitor data quality."
            }
            Self::Contaminated => {
                "Severe ice contamination detected. Consider re-mounting \
                 crystal."
            }
        }
    }

    /// Accent colour for the status card.
    #[must_use]
    pub fn color(self) -> Rgb {
        hex_rgb(match self {
            Self::Clean => 0x00_ff88,
            Self::Warning => 0xff_aa00,
            Self::Contaminated => 0xff_3333,
        })
    }
}

/// Reply of the ice-ring analysis backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IceAnalysis {
    /// Any ring above the detection threshold.
    pub ice_detected: bool,
    /// Status label, e.g. `CLEAN` or `ANALYSIS FAILED`.
    pub status: String,
    /// Operator recommendation.
    pub recommendation: String,
    /// Number of detected rings.
    pub ring_count: u32,
    /// Highest ring contamination percentage.
    pub max_contamination: f32,
    /// The rings themselves.
    #[serde(default)]
    pub detected_rings: Vec<IceRing>,
}

impl IceAnalysis {
    /// Status label of the record produced when the analysis is unavailable.
    pub const FAILED_STATUS: &'static str = "ANALYSIS FAILED";

    /// The placeholder record shown when the backend cannot be reached or
    /// replies with something unreadable.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            ice_detected: false,
            status: Self::FAILED_STATUS.to_owned(),
            recommendation: "Unable to connect to backend API".to_owned(),
            ring_count: 0,
            max_contamination: 0.0,
            detected_rings: Vec::new(),
        }
    }

    /// Build a record from locally known rings, mirroring the backend's
    /// classification.
    #[must_use]
    pub fn from_rings(detected_rings: Vec<IceRing>) -> Self {
        let max_contamination = detected_rings
            .iter()
            .map(|r| r.contamination_level)
            .fold(0.0_f32, f32::max);
        let status = IceStatus::of(max_contamination);
        Self {
            ice_detected: !detected_rings.is_empty(),
            status: status.label().to_owned(),
            recommendation: status.recommendation().to_owned(),
            ring_count: detected_rings.len() as u32,
            max_contamination,
            detected_rings,
        }
    }

    /// Resolve a fetch outcome into a record. Transport failures and
    /// malformed bodies both become [`IceAnalysis::fallback`].
    pub fn from_fetch<E: Display>(body: Result<String, E>) -> Self {
        match body {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(analysis) => analysis,
                Err(e) => {
                    log::warn!("ice analysis reply unreadable: {e}");
                    Self::fallback()
                }
            },
            Err(e) => {
                log::warn!("ice analysis fetch failed: {e}");
                Self::fallback()
            }
        }
    }

    /// Whether this is the placeholder record.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.status == Self::FAILED_STATUS
    }

    /// Accent colour for the status card. Dimmed grey for the fallback.
    #[must_use]
    pub fn color(&self) -> Rgb {
        if self.is_fallback() {
            hex_rgb(0x66_6666)
        } else {
            IceStatus::of(self.max_contamination).color()
        }
    }
}
