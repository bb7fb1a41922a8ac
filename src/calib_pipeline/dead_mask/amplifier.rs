//! Amplifier readout regions.
//!
//! Each CCD is read through four amplifiers. The header keyword `CCDSEC<amp>`
//! locates an amplifier's pixels as a FITS section string `[x1:x2,y1:y2]`
//! (1-based, inclusive, x along NAXIS1). Amplifiers A and B sit at the bottom of
//! the detector and clock charge towards row 0; C and D sit at the top and clock
//! towards the last row.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{Display, EnumCount, EnumIter};
use tracing::{debug, error};

use crate::calib_pipeline::common::error::{CalibError, Result};
use crate::calib_pipeline::fits::FitsHeader;

static SECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[\s*(\d+)\s*:\s*(\d+)\s*,\s*(\d+)\s*:\s*(\d+)\s*\]$")
        .expect("section pattern is valid")
});

#[derive(EnumIter, EnumCount, Display, Clone, Copy, PartialEq, Eq, Debug)]
pub enum AmpName {
    A,
    B,
    C,
    D,
}

/// Order in which the rows of a column are clocked out.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ReadoutDirection {
    /// Row 0 first, increasing row index
    Forward,
    /// Last row first, decreasing row index
    Reverse,
}

/// Readout direction of every amplifier, in declaration order.
pub const READOUT_DIRECTIONS: [(AmpName, ReadoutDirection); AmpName::COUNT] = [
    (AmpName::A, ReadoutDirection::Forward),
    (AmpName::B, ReadoutDirection::Forward),
    (AmpName::C, ReadoutDirection::Reverse),
    (AmpName::D, ReadoutDirection::Reverse),
];

const _: () = {
    let mut i = 0;
    while i < AmpName::COUNT {
        assert!(READOUT_DIRECTIONS[i].0 as usize == i, "READOUT_DIRECTIONS out of order");
        i += 1;
    }
};

impl AmpName {
    pub fn section_keyword(self) -> String {
        format!("CCDSEC{self}")
    }

    pub fn readout_direction(self) -> ReadoutDirection {
        READOUT_DIRECTIONS[self as usize].1
    }
}

impl ReadoutDirection {
    /// Row offsets within a region of `len` rows, in readout order.
    pub fn order(self, len: usize) -> Box<dyn Iterator<Item = usize>> {
        match self {
            ReadoutDirection::Forward => Box::new(0..len),
            ReadoutDirection::Reverse => Box::new((0..len).rev()),
        }
    }
}

/// Zero-based, half-open pixel window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Section {
    pub rows: Range<usize>,
    pub cols: Range<usize>,
}

impl Section {
    /// Parses a FITS section string such as `[1:2057,1:2064]`.
    pub fn parse(text: &str) -> Result<Self> {
        let caps = SECTION_RE
            .captures(text.trim())
            .ok_or_else(|| CalibError::InvalidSection(text.to_string()))?;
        let bound = |i: usize| -> Result<usize> {
            caps[i]
                .parse::<usize>()
                .map_err(|_| CalibError::InvalidSection(text.to_string()))
        };
        let (x1, x2, y1, y2) = (bound(1)?, bound(2)?, bound(3)?, bound(4)?);
        if x1 == 0 || y1 == 0 || x1 > x2 || y1 > y2 {
            return Err(CalibError::InvalidSection(text.to_string()));
        }
        Ok(Self {
            rows: y1 - 1..y2,
            cols: x1 - 1..x2,
        })
    }

    pub fn fits_within(&self, shape: (usize, usize)) -> bool {
        self.rows.end <= shape.0 && self.cols.end <= shape.1
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AmplifierRegion {
    pub amp: AmpName,
    pub section: Section,
    pub direction: ReadoutDirection,
}

/// Reads the four amplifier regions from `header`.
///
/// A missing `CCDSEC` keyword leaves the amplifier's location unknown, which is fatal.
pub fn regions_from_header(
    header: &FitsHeader,
    shape: (usize, usize),
) -> Result<Vec<AmplifierRegion>> {
    AmpName::iter()
        .map(|amp| {
            let key = amp.section_keyword();
            let text = header.get_str(&key).ok_or_else(|| {
                error!("Header keyword {} is missing", key);
                CalibError::MissingKeyword(key.clone())
            })?;
            let section = Section::parse(text)?;
            if !section.fits_within(shape) {
                error!("{} = {} lies outside a {:?} image", key, text, shape);
                return Err(CalibError::InvalidSection(format!("{key} = {text}")));
            }
            let direction = amp.readout_direction();
            debug!("Amp {}: rows {:?} cols {:?} {:?}", amp, section.rows, section.cols, direction);
            Ok(AmplifierRegion { amp, section, direction })
        })
        .collect()
}
