//! Preprocessed calibration image module
//!
//! Loads the pixel values, inverse variance and header of preprocessed exposures.

mod reader;
mod fits_preproc_reader;
pub mod types;

pub use reader::CalibrationImageReader;
pub use fits_preproc_reader::FitsPreprocReader;
pub use types::CalibrationImage;
