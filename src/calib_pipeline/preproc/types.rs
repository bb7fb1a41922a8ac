//! Preprocessed calibration image types

use std::path::PathBuf;

use ndarray::Array2;

use crate::calib_pipeline::common::error::{CalibError, Result};
use crate::calib_pipeline::fits::FitsHeader;

/// A preprocessed exposure, read-only once loaded.
#[derive(Debug, Clone)]
pub struct CalibrationImage {
    /// File the image was loaded from, recorded as provenance
    pub path: PathBuf,
    /// Pixel values
    pub image: Array2<f64>,
    /// Inverse variance; zero marks pixels excluded upstream
    pub ivar: Array2<f64>,
    /// Header of the image HDU, holding the amplifier sections
    pub header: FitsHeader,
}

impl CalibrationImage {
    pub fn new(
        path: impl Into<PathBuf>,
        image: Array2<f64>,
        ivar: Array2<f64>,
        header: FitsHeader,
    ) -> Result<Self> {
        let path = path.into();
        if image.dim() != ivar.dim() {
            return Err(CalibError::ShapeMismatch {
                context: format!("IVAR of {}", path.display()),
                expected: image.dim(),
                found: ivar.dim(),
            });
        }
        Ok(Self { path, image, ivar, header })
    }

    /// `(rows, cols)` shared by `image` and `ivar`.
    pub fn shape(&self) -> (usize, usize) {
        self.image.dim()
    }
}
