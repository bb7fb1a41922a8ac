//! CCD pixel mask bits

use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

/// Bit assignments of the per-pixel CCD mask.
#[derive(EnumIter, Display, Clone, Copy, PartialEq, Eq, Debug)]
#[strum(serialize_all = "UPPERCASE")]
pub enum CcdMask {
    /// Unspecified bad pixel
    Bad = 0,
    /// Hot pixel
    Hot = 1,
    /// Dead pixel, or pixel downstream of one in the readout
    Dead = 2,
    /// Saturated pixel
    Saturated = 3,
    /// Cosmic ray hit
    Cosmic = 4,
    /// Pixel flat is zero
    PixFlatZero = 5,
    /// Pixel flat is anomalously low
    PixFlatLow = 6,
    /// Variance inconsistent with the read noise and signal
    HighVar = 7,
    /// Amplifier read noise is unusually high
    BadReadNoise = 8,
}

impl CcdMask {
    pub const fn bit(self) -> u32 {
        self as u32
    }

    pub const fn value(self) -> u16 {
        1 << self.bit()
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::iter().find(|flag| flag.to_string().eq_ignore_ascii_case(name))
    }

    /// Flags set in a mask value, lowest bit first.
    pub fn decode(value: u16) -> Vec<Self> {
        Self::iter().filter(|flag| value & flag.value() != 0).collect()
    }
}
