//! Calibration pipeline module
//!
//! This module provides the spectrograph calibration tools, with separate modules
//! for FITS I/O, preprocessed image loading, dead-pixel masking and arc-line lists.

pub mod common;
pub mod fits;
pub mod preproc;
pub mod dead_mask;
pub mod arc_lines;

pub use common::{
    CalibError,
    Result,
};

pub use fits::{
    FitsHeader,
    FitsReader,
    FitsWriter,
    FitsioReader,
    FitsioWriter,
    Hdu,
    HduName,
    ImageData,
};

pub use preproc::{
    CalibrationImage,
    CalibrationImageReader,
    FitsPreprocReader,
};

pub use dead_mask::{
    CcdMask,
    DeadMaskConfig,
    DeadMaskConfigBuilder,
    DeadMaskResult,
    DeadPixelMaskBuilder,
    OutputMask,
};

pub use arc_lines::{
    ArcLineConfig,
    ArcLineGenerator,
    Camera,
    ScoredLine,
};
