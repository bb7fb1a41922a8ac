//! FITS reader backed by cfitsio.
//!
//! Only the requested header keywords are read. Integer images with `BZERO` 32768
//! come back as unsigned 16-bit, single precision images as `f32`, and every
//! other image type as scaled `f64`.

use std::path::Path;

use fitsio::FitsFile;
use fitsio::errors::Error as FitsioError;
use fitsio::hdu::{FitsHdu, HduInfo};
use fitsio::images::ImageType;
use ndarray::Array2;
use tracing::debug;

use crate::calib_pipeline::common::error::{CalibError, Result};
use crate::calib_pipeline::fits::header::FitsHeader;
use crate::calib_pipeline::fits::keys;
use crate::calib_pipeline::fits::reader::{FitsReader, HduName};
use crate::calib_pipeline::fits::types::{Hdu, ImageData};

/// cfitsio status for an HDU that cannot be found.
const BAD_HDU_NUM: i32 = 301;

/// Reads through cfitsio, so gzip-compressed files open as well.
#[derive(Debug, Clone, Copy, Default)]
pub struct FitsioReader;

impl FitsReader for FitsioReader {
    fn read_hdu(&self, path: &Path, name: HduName<'_>, wanted: &[String]) -> Result<Option<Hdu>> {
        let mut fptr = FitsFile::open(path)
            .map_err(|e| CalibError::InputReadError(format!("{}: {}", path.display(), e)))?;

        let hdu = match name {
            HduName::Primary => fptr.primary_hdu()?,
            HduName::Extension(extname) => match fptr.hdu(extname) {
                Ok(hdu) => hdu,
                Err(FitsioError::Fits(e)) if e.status == BAD_HDU_NUM => return Ok(None),
                Err(e) => return Err(e.into()),
            },
        };

        // Keywords are read from the current HDU, which is the one just looked up.
        let mut header = FitsHeader::new();
        for key in std::iter::once("EXTNAME").chain(wanted.iter().map(String::as_str)) {
            if let Some(value) = keys::read_key(&mut fptr, key)? {
                header.set(key, value);
            }
        }

        let data = read_data(&hdu, &mut fptr)?;
        debug!(
            "Read HDU {:?} of {}: shape {:?}, {} header keys",
            name,
            path.display(),
            data.shape(),
            header.len()
        );

        Ok(Some(Hdu::new(header, data)))
    }
}

fn read_data(hdu: &FitsHdu, fptr: &mut FitsFile) -> Result<ImageData> {
    let (shape, image_type) = match &hdu.info {
        HduInfo::ImageInfo { shape, image_type } => (shape, image_type),
        _ => return Ok(ImageData::Empty),
    };

    // cfitsio reports the axes slowest first: [NAXIS2, NAXIS1]
    let &[rows, cols] = shape.as_slice() else {
        return Ok(ImageData::Empty);
    };

    rows.checked_mul(cols)
        .and_then(|n| n.checked_mul(std::mem::size_of::<f64>()))
        .ok_or_else(|| {
            CalibError::DecodeError(format!("image of {rows}x{cols} pixels is too large"))
        })?;

    let data = match image_type {
        ImageType::UnsignedShort => ImageData::U16(to_array(hdu.read_image(fptr)?, rows, cols)?),
        ImageType::Float => ImageData::F32(to_array(hdu.read_image(fptr)?, rows, cols)?),
        // cfitsio applies BSCALE/BZERO when converting to double
        _ => ImageData::F64(to_array(hdu.read_image(fptr)?, rows, cols)?),
    };
    Ok(data)
}

fn to_array<T>(pixels: Vec<T>, rows: usize, cols: usize) -> Result<Array2<T>> {
    Array2::from_shape_vec((rows, cols), pixels)
        .map_err(|e| CalibError::DecodeError(format!("image of {rows}x{cols}: {e}")))
}
