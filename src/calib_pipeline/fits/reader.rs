use std::path::Path;

use crate::calib_pipeline::common::error::Result;
use crate::calib_pipeline::fits::types::Hdu;

/// Which HDU of a file to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HduName<'a> {
    Primary,
    Extension(&'a str),
}

pub trait FitsReader {
    /// Reads the image of one HDU together with those of `keys` its header carries.
    ///
    /// Returns `Ok(None)` when the file has no extension of that name.
    fn read_hdu(&self, path: &Path, name: HduName<'_>, keys: &[String]) -> Result<Option<Hdu>>;
}
