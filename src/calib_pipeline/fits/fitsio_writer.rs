//! FITS writer backed by cfitsio.
//!
//! cfitsio emits the mandatory cards itself (`BITPIX`, `NAXISn`, and `BZERO` for
//! unsigned 16-bit data); the HDU header contributes every other keyword.

use std::path::Path;

use fitsio::FitsFile;
use fitsio::hdu::FitsHdu;
use fitsio::images::{ImageDescription, ImageType};
use tracing::debug;

use crate::calib_pipeline::common::error::{CalibError, Result};
use crate::calib_pipeline::fits::keys;
use crate::calib_pipeline::fits::types::{Hdu, ImageData};
use crate::calib_pipeline::fits::writer::FitsWriter;

#[derive(Debug, Clone, Copy, Default)]
pub struct FitsioWriter;

impl FitsWriter for FitsioWriter {
    fn write_hdus(&self, hdus: &[Hdu], path: &Path) -> Result<()> {
        let (primary, extensions) = hdus
            .split_first()
            .ok_or_else(|| CalibError::EncodeError("no HDUs to write".to_string()))?;

        let (data_type, dimensions) = layout(&primary.data);
        let description = ImageDescription {
            data_type,
            dimensions: &dimensions,
        };
        let mut fptr = FitsFile::create(path)
            .with_custom_primary(&description)
            .overwrite()
            .open()
            .map_err(|e| CalibError::OutputWriteError(format!("{}: {}", path.display(), e)))?;

        let hdu = fptr.primary_hdu()?;
        write_hdu(&mut fptr, &hdu, primary)?;

        for (index, extension) in extensions.iter().enumerate() {
            let extname = extension
                .extname()
                .map(str::to_string)
                .unwrap_or_else(|| format!("HDU{}", index + 1));
            let (data_type, dimensions) = layout(&extension.data);
            let description = ImageDescription {
                data_type,
                dimensions: &dimensions,
            };
            let hdu = fptr.create_image(extname, &description)?;
            write_hdu(&mut fptr, &hdu, extension)?;
        }

        debug!("Wrote {} HDUs to {}", hdus.len(), path.display());
        Ok(())
    }
}

/// cfitsio image type and axes, slowest first, of a payload.
fn layout(data: &ImageData) -> (ImageType, Vec<usize>) {
    match data {
        ImageData::Empty => (ImageType::UnsignedByte, Vec::new()),
        ImageData::U16(a) => (ImageType::UnsignedShort, a.shape().to_vec()),
        ImageData::F32(a) => (ImageType::Float, a.shape().to_vec()),
        ImageData::F64(a) => (ImageType::Double, a.shape().to_vec()),
    }
}

fn write_hdu(fptr: &mut FitsFile, hdu: &FitsHdu, source: &Hdu) -> Result<()> {
    match &source.data {
        ImageData::Empty => {}
        ImageData::U16(a) => hdu.write_image(fptr, &a.iter().copied().collect::<Vec<_>>())?,
        ImageData::F32(a) => hdu.write_image(fptr, &a.iter().copied().collect::<Vec<_>>())?,
        ImageData::F64(a) => hdu.write_image(fptr, &a.iter().copied().collect::<Vec<_>>())?,
    }

    // Keywords go to the current HDU, which is `hdu` after it was created or written.
    for (key, value) in source.header.iter() {
        if keys::is_structural(key) {
            continue;
        }
        keys::write_key(fptr, key, value)?;
    }
    Ok(())
}
