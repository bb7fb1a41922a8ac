use std::path::Path;
use crate::calib_pipeline::common::error::Result;
use crate::calib_pipeline::preproc::types::CalibrationImage;

pub trait CalibrationImageReader {
    fn read_image(&self, path: &Path) -> Result<CalibrationImage>;
}
