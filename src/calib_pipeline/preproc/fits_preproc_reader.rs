//! Reader for preprocessed exposures stored as FITS.
//!
//! The pixel values come from the HDU named `IMAGE`, falling back to the primary
//! HDU when no HDU carries that name; the inverse variance comes from the HDU
//! named `IVAR`. The image HDU header is kept for the amplifier sections.

use std::path::Path;

use strum::IntoEnumIterator;
use tracing::debug;

use crate::calib_pipeline::common::error::{CalibError, Result};
use crate::calib_pipeline::dead_mask::AmpName;
use crate::calib_pipeline::fits::{FitsReader, FitsioReader, Hdu, HduName};
use crate::calib_pipeline::preproc::reader::CalibrationImageReader;
use crate::calib_pipeline::preproc::types::CalibrationImage;

/// Image header keywords kept besides the amplifier sections.
const EXTRA_KEYS: [&str; 3] = ["CAMERA", "NIGHT", "EXPID"];

pub struct FitsPreprocReader<R: FitsReader = FitsioReader> {
    fits: R,
    keys: Vec<String>,
}

impl FitsPreprocReader<FitsioReader> {
    pub fn new() -> Self {
        Self::with_custom(FitsioReader)
    }
}

impl Default for FitsPreprocReader<FitsioReader> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: FitsReader> FitsPreprocReader<R> {
    pub fn with_custom(fits: R) -> Self {
        let keys = AmpName::iter()
            .map(AmpName::section_keyword)
            .chain(EXTRA_KEYS.iter().map(|key| key.to_string()))
            .collect();
        Self { fits, keys }
    }

    fn image_hdu(&self, path: &Path) -> Result<Hdu> {
        if let Some(hdu) = self.fits.read_hdu(path, HduName::Extension("IMAGE"), &self.keys)? {
            return Ok(hdu);
        }
        self.fits
            .read_hdu(path, HduName::Primary, &self.keys)?
            .filter(|hdu| hdu.data.shape().is_some())
            .ok_or_else(|| CalibError::MissingHdu("IMAGE".to_string()))
    }
}

impl<R: FitsReader> CalibrationImageReader for FitsPreprocReader<R> {
    fn read_image(&self, path: &Path) -> Result<CalibrationImage> {
        let image_hdu = self.image_hdu(path)?;
        let ivar_hdu = self
            .fits
            .read_hdu(path, HduName::Extension("IVAR"), &[])?
            .ok_or_else(|| CalibError::MissingHdu("IVAR".to_string()))?;
        debug!("Read IMAGE and IVAR of {}", path.display());

        let image = pixels(&image_hdu, "IMAGE")?;
        let ivar = pixels(&ivar_hdu, "IVAR")?;

        CalibrationImage::new(path, image, ivar, image_hdu.header)
    }
}

fn pixels(hdu: &Hdu, name: &str) -> Result<ndarray::Array2<f64>> {
    hdu.data
        .to_f64()
        .ok_or_else(|| CalibError::DecodeError(format!("{name} HDU holds no 2-D image")))
}
