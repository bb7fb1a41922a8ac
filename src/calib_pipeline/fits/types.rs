//! FITS HDU data types

use ndarray::Array2;

use crate::calib_pipeline::fits::header::FitsHeader;

/// Pixel payload of an image HDU, indexed `[row, col]` = `[NAXIS2, NAXIS1]`.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageData {
    /// Header-only HDU (NAXIS = 0), a non-image extension or an image that is not 2-D
    Empty,
    /// Unsigned 16-bit integers, stored as BITPIX 16 with BZERO 32768
    U16(Array2<u16>),
    /// 32-bit IEEE floats (BITPIX -32)
    F32(Array2<f32>),
    /// 64-bit IEEE floats (BITPIX -64)
    F64(Array2<f64>),
}

impl ImageData {
    /// `(rows, cols)` of the payload, `None` when empty.
    pub fn shape(&self) -> Option<(usize, usize)> {
        match self {
            ImageData::Empty => None,
            ImageData::U16(a) => Some(a.dim()),
            ImageData::F32(a) => Some(a.dim()),
            ImageData::F64(a) => Some(a.dim()),
        }
    }

    /// Converts to `f64`, the working precision of the pipeline.
    pub fn to_f64(&self) -> Option<Array2<f64>> {
        match self {
            ImageData::Empty => None,
            ImageData::U16(a) => Some(a.mapv(f64::from)),
            ImageData::F32(a) => Some(a.mapv(f64::from)),
            ImageData::F64(a) => Some(a.clone()),
        }
    }
}

/// One header/data unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Hdu {
    pub header: FitsHeader,
    pub data: ImageData,
}

impl Hdu {
    pub fn new(header: FitsHeader, data: ImageData) -> Self {
        Self { header, data }
    }

    /// Builds an HDU with `EXTNAME` set.
    pub fn named(extname: &str, mut header: FitsHeader, data: ImageData) -> Self {
        header.set("EXTNAME", extname);
        Self { header, data }
    }

    pub fn extname(&self) -> Option<&str> {
        self.header.extname()
    }
}
