//! Dead-pixel mask module
//!
//! Builds a static CCD mask from a stack of preprocessed dark exposures: pixels
//! that are significant in the median dark, and pixels read out after enough
//! such pixels in the same column, receive the DEAD bit.

pub mod amplifier;
pub mod bits;
pub mod propagation;
pub mod significance;
mod pipeline;
mod timing;
pub mod types;


pub use amplifier::{AmpName, AmplifierRegion, ReadoutDirection, Section, regions_from_header};
pub use bits::CcdMask;
pub use pipeline::{
    DEBUG_ANY_BAD_FILE, DEBUG_BAD_FRACTION_FILE, DEBUG_SIGNIFICANCE_FILE, DeadPixelMaskBuilder,
};
pub use timing::{PipelineTimings, StepTiming, Timer};
pub use types::{
    DeadMaskConfig, DeadMaskConfigBuilder, DeadMaskDiagnostics, DeadMaskResult, MASK_EXTNAME,
    MAX_INPUTS, NDEAD_KEY, OutputMask, input_key, inputs_from_header,
};
