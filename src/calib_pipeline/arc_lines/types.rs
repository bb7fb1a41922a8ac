//! Arc-line list types

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

use crate::calib_pipeline::common::error::{CalibError, Result};

/// Spectrograph camera channel.
#[derive(EnumIter, Display, Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[strum(serialize_all = "lowercase")]
pub enum Camera {
    /// Blue arm
    B,
    /// Red arm
    R,
    /// Near-infrared arm
    Z,
}

/// One line of the master reference list.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct MasterLine {
    #[serde(rename = "Ion")]
    pub ion: String,
    /// Vacuum wavelength in Angstrom
    #[serde(rename = "wave")]
    pub wave: f64,
    #[serde(rename = "RelInt")]
    pub rel_int: f64,
}

/// A master line with its priority score; lower scores are preferred.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ScoredLine {
    #[serde(rename = "Ion")]
    pub ion: String,
    #[serde(rename = "wave")]
    pub wave: f64,
    #[serde(rename = "score")]
    pub score: u8,
    #[serde(rename = "RelInt")]
    pub rel_int: f64,
}

/// Configuration for arc-line scoring
#[derive(Debug, Clone)]
pub struct ArcLineConfig {
    /// Largest wavelength difference, exclusive, for a master line to match a good line
    pub tolerance: f64,
    /// Score of lines that match no good line
    pub default_score: u8,
    /// Score of lines matching a good line
    pub good_score: u8,
    /// Cameras whose good lines are consulted
    pub cameras: Vec<Camera>,
}

impl Default for ArcLineConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.1,
            default_score: 2,
            good_score: 1,
            cameras: vec![Camera::B, Camera::R, Camera::Z],
        }
    }
}

impl ArcLineConfig {
    pub fn builder() -> ArcLineConfigBuilder {
        ArcLineConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(CalibError::InvalidParameter {
                name: "tolerance",
                reason: format!("{} is not a positive number", self.tolerance),
            });
        }
        if self.cameras.is_empty() {
            return Err(CalibError::InvalidParameter {
                name: "cameras",
                reason: "no camera selected".to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for ArcLineConfig
#[derive(Default)]
pub struct ArcLineConfigBuilder {
    tolerance: Option<f64>,
    default_score: Option<u8>,
    good_score: Option<u8>,
    cameras: Option<Vec<Camera>>,
}

impl ArcLineConfigBuilder {
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    pub fn default_score(mut self, score: u8) -> Self {
        self.default_score = Some(score);
        self
    }

    pub fn good_score(mut self, score: u8) -> Self {
        self.good_score = Some(score);
        self
    }

    pub fn cameras(mut self, cameras: Vec<Camera>) -> Self {
        self.cameras = Some(cameras);
        self
    }

    pub fn build(self) -> ArcLineConfig {
        let default = ArcLineConfig::default();
        ArcLineConfig {
            tolerance: self.tolerance.unwrap_or(default.tolerance),
            default_score: self.default_score.unwrap_or(default.default_score),
            good_score: self.good_score.unwrap_or(default.good_score),
            cameras: self.cameras.unwrap_or(default.cameras),
        }
    }
}
