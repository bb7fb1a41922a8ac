use std::path::Path;

use crate::calib_pipeline::common::error::Result;
use crate::calib_pipeline::fits::types::Hdu;

pub trait FitsWriter {
    /// Writes `hdus` to `path`, the first one as the primary HDU. An existing file is replaced.
    fn write_hdus(&self, hdus: &[Hdu], path: &Path) -> Result<()>;
}
