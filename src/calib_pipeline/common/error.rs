use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalibError {
    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("Failed to decode FITS data: {0}")]
    DecodeError(String),

    #[error("Failed to encode FITS data: {0}")]
    EncodeError(String),

    #[error("Missing required header keyword: {0}")]
    MissingKeyword(String),

    #[error("Missing HDU with EXTNAME {0}")]
    MissingHdu(String),

    #[error("Malformed section string: {0}")]
    InvalidSection(String),

    #[error("Shape mismatch in {context}: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        context: String,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("No input images given")]
    NoInputs,

    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("FITS error: {0}")]
    Fits(#[from] fitsio::errors::Error),

    #[error("FITS status {status} on keyword {key}")]
    FitsStatus { key: String, status: i32 },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CalibError>;
