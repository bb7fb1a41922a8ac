//! Dead-pixel mask configuration and output types

use std::path::{Path, PathBuf};

use ndarray::Array2;

use crate::calib_pipeline::common::error::{CalibError, Result};
use crate::calib_pipeline::dead_mask::bits::CcdMask;
use crate::calib_pipeline::fits::{FitsHeader, FitsReader, Hdu, HduName, ImageData};

/// Header keyword counting the flagged pixels of a mask.
pub const NDEAD_KEY: &str = "NDEAD";

/// `EXTNAME` of the mask HDU.
pub const MASK_EXTNAME: &str = "MASK";

/// Inputs that fit the three-digit `INPUT%03d` keywords.
pub const MAX_INPUTS: usize = 1000;

/// Configuration for dead-pixel mask computation
#[derive(Debug, Clone)]
pub struct DeadMaskConfig {
    /// Significance threshold, in units of the per-pixel standard deviation
    pub nsig: f64,
    /// Bad fraction read earlier in a column above which a pixel is masked
    pub frac_downstream_mask: f64,
    /// Whether to write the intermediate grids
    pub debug: bool,
    /// Directory for the intermediate grids; defaults to the output file's directory
    pub debug_dir: Option<PathBuf>,
}

impl Default for DeadMaskConfig {
    fn default() -> Self {
        Self {
            nsig: 3.0,
            frac_downstream_mask: 0.3,
            debug: false,
            debug_dir: None,
        }
    }
}

impl DeadMaskConfig {
    pub fn builder() -> DeadMaskConfigBuilder {
        DeadMaskConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        if !self.nsig.is_finite() || self.nsig <= 0.0 {
            return Err(CalibError::InvalidParameter {
                name: "nsig",
                reason: format!("{} is not a positive number", self.nsig),
            });
        }
        if !(0.0..=1.0).contains(&self.frac_downstream_mask) {
            return Err(CalibError::InvalidParameter {
                name: "frac_downstream_mask",
                reason: format!("{} is outside [0, 1]", self.frac_downstream_mask),
            });
        }
        Ok(())
    }
}

/// Builder for DeadMaskConfig
#[derive(Default)]
pub struct DeadMaskConfigBuilder {
    nsig: Option<f64>,
    frac_downstream_mask: Option<f64>,
    debug: Option<bool>,
    debug_dir: Option<Option<PathBuf>>,
}

impl DeadMaskConfigBuilder {
    pub fn nsig(mut self, nsig: f64) -> Self {
        self.nsig = Some(nsig);
        self
    }

    pub fn frac_downstream_mask(mut self, frac: f64) -> Self {
        self.frac_downstream_mask = Some(frac);
        self
    }

    pub fn debug(mut self, enable: bool) -> Self {
        self.debug = Some(enable);
        self
    }

    pub fn debug_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.debug_dir = Some(dir);
        self
    }

    pub fn build(self) -> DeadMaskConfig {
        let default = DeadMaskConfig::default();
        DeadMaskConfig {
            nsig: self.nsig.unwrap_or(default.nsig),
            frac_downstream_mask: self.frac_downstream_mask.unwrap_or(default.frac_downstream_mask),
            debug: self.debug.unwrap_or(default.debug),
            debug_dir: self.debug_dir.unwrap_or(default.debug_dir),
        }
    }
}

/// The emitted mask with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputMask {
    /// `CcdMask::Dead` where flagged, zero elsewhere
    pub mask: Array2<u16>,
    /// Number of flagged pixels
    pub ndead: usize,
    /// Input file names, in the order given
    pub inputs: Vec<String>,
}

impl OutputMask {
    /// Sets the DEAD bit wherever `badness` is positive.
    pub fn from_badness(badness: &Array2<u8>, inputs: Vec<String>) -> Self {
        let dead = CcdMask::Dead.value();
        let mask = badness.mapv(|b| if b > 0 { dead } else { 0 });
        let ndead = mask.iter().filter(|&&m| m != 0).count();
        Self { mask, ndead, inputs }
    }

    pub fn header(&self) -> FitsHeader {
        let mut header = FitsHeader::new();
        for (i, input) in self.inputs.iter().enumerate() {
            header.set(&input_key(i), input.as_str());
        }
        header.set(NDEAD_KEY, self.ndead);
        header
    }

    pub fn to_hdu(&self) -> Hdu {
        Hdu::named(MASK_EXTNAME, self.header(), ImageData::U16(self.mask.clone()))
    }

    /// Reads back a mask file, provenance included.
    pub fn read<R: FitsReader>(reader: &R, path: &Path) -> Result<Self> {
        let keys: Vec<String> = (0..MAX_INPUTS)
            .map(input_key)
            .chain([NDEAD_KEY.to_string()])
            .collect();
        let hdu = reader
            .read_hdu(path, HduName::Extension(MASK_EXTNAME), &keys)?
            .ok_or_else(|| CalibError::MissingHdu(MASK_EXTNAME.to_string()))?;

        let ndead = hdu
            .header
            .get_int(NDEAD_KEY)
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| CalibError::MissingKeyword(NDEAD_KEY.to_string()))?;
        let inputs = inputs_from_header(&hdu.header);
        let ImageData::U16(mask) = hdu.data else {
            return Err(CalibError::DecodeError(format!(
                "{MASK_EXTNAME} HDU of {} is not unsigned 16-bit",
                path.display()
            )));
        };

        Ok(Self { mask, ndead, inputs })
    }
}

/// `INPUT000`, `INPUT001`, ...
pub fn input_key(index: usize) -> String {
    format!("INPUT{index:03}")
}

/// Input file names recorded in a mask header, in their original order.
pub fn inputs_from_header(header: &FitsHeader) -> Vec<String> {
    (0..)
        .map_while(|i| header.get_str(&input_key(i)).map(str::to_string))
        .collect()
}

/// Intermediate grids kept when debugging.
#[derive(Debug, Clone)]
pub struct DeadMaskDiagnostics {
    pub significance: Array2<f64>,
    pub bad_fraction: Array2<f64>,
    pub any_bad: Array2<bool>,
}

/// Result of one mask computation.
#[derive(Debug, Clone)]
pub struct DeadMaskResult {
    pub output: OutputMask,
    /// Pixels flagged by the significance threshold alone
    pub n_initial: usize,
    /// Pixels added by downstream propagation
    pub n_downstream: usize,
    pub diagnostics: Option<DeadMaskDiagnostics>,
}
