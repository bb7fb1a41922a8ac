//! FITS image I/O module
//!
//! This module provides reading and writing of multi-HDU FITS files holding 2-D
//! images, on top of cfitsio through the `fitsio` crate.

mod fitsio_reader;
mod fitsio_writer;
pub mod header;
mod keys;
mod reader;
pub mod types;
mod writer;

#[cfg(test)]
mod tests;

pub use fitsio_reader::FitsioReader;
pub use fitsio_writer::FitsioWriter;
pub use header::{FitsHeader, HeaderValue};
pub use reader::{FitsReader, HduName};
pub use types::{Hdu, ImageData};
pub use writer::FitsWriter;
