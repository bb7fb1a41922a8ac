//! Header keyword access on the current HDU of an open file.
//!
//! String values go through the cfitsio long-string calls, so values longer than
//! one card are written with `CONTINUE` records and read back whole.

use std::ffi::{CStr, CString, c_char, c_int};
use std::ptr;

use fitsio::FitsFile;
use fitsio::sys;

use crate::calib_pipeline::common::error::{CalibError, Result};
use crate::calib_pipeline::fits::header::HeaderValue;

const KEY_NO_EXIST: c_int = 202;
const VALUE_UNDEFINED: c_int = 204;

/// Room for any card value or comment cfitsio copies out, with the nul.
const CARD_BUF: usize = 81;

/// Digits kept when writing floating point values.
const FLOAT_DIGITS: c_int = -15;

/// Keys cfitsio derives from the image layout; never taken from a header.
pub(crate) const STRUCTURAL_KEYS: &[&str] = &[
    "SIMPLE", "XTENSION", "BITPIX", "NAXIS", "NAXIS1", "NAXIS2", "EXTEND", "PCOUNT",
    "GCOUNT", "BZERO", "BSCALE", "END",
];

pub(crate) fn is_structural(key: &str) -> bool {
    STRUCTURAL_KEYS.contains(&key) || key.starts_with("NAXIS")
}

/// Reads `key` from the current HDU; `Ok(None)` when absent or without a value.
pub(crate) fn read_key(fptr: &mut FitsFile, key: &str) -> Result<Option<HeaderValue>> {
    let c_key = c_string(key)?;
    let mut raw = [0 as c_char; CARD_BUF];
    let mut comment = [0 as c_char; CARD_BUF];
    let mut status = 0;

    // SAFETY: both buffers are larger than the longest value and comment of a card.
    unsafe {
        sys::ffgkey(
            fptr.as_raw(),
            c_key.as_ptr().cast_mut(),
            raw.as_mut_ptr(),
            comment.as_mut_ptr(),
            &mut status,
        );
    }
    match status {
        0 => {}
        KEY_NO_EXIST => return Ok(None),
        _ => return Err(status_error(key, status)),
    }

    let mut dtype: c_char = 0;
    // SAFETY: `raw` was nul-terminated by cfitsio.
    unsafe {
        sys::ffdtyp(raw.as_ptr().cast_mut(), &mut dtype, &mut status);
    }
    match status {
        0 => {}
        VALUE_UNDEFINED => return Ok(None),
        _ => return Err(status_error(key, status)),
    }

    // SAFETY: as above.
    let text = unsafe { CStr::from_ptr(raw.as_ptr()) }
        .to_string_lossy()
        .trim()
        .to_string();

    let value = match dtype as u8 {
        b'C' => HeaderValue::Str(read_long_string(fptr, &c_key, key)?),
        b'I' => text
            .parse()
            .map(HeaderValue::Int)
            .map_err(|e| CalibError::DecodeError(format!("{key} = {text}: {e}")))?,
        b'F' => text
            .replace(['D', 'd'], "E")
            .parse()
            .map(HeaderValue::Float)
            .map_err(|e| CalibError::DecodeError(format!("{key} = {text}: {e}")))?,
        _ => HeaderValue::Str(text),
    };
    Ok(Some(value))
}

fn read_long_string(fptr: &mut FitsFile, c_key: &CStr, key: &str) -> Result<String> {
    let mut value: *mut c_char = ptr::null_mut();
    let mut comment = [0 as c_char; CARD_BUF];
    let mut status = 0;

    // SAFETY: cfitsio allocates `value`; it is released with `fffree` below.
    unsafe {
        sys::ffgkls(
            fptr.as_raw(),
            c_key.as_ptr().cast_mut(),
            &mut value,
            comment.as_mut_ptr(),
            &mut status,
        );
    }

    let text = if value.is_null() {
        String::new()
    } else {
        // SAFETY: a non-null `value` is a nul-terminated string owned by cfitsio.
        let text = unsafe { CStr::from_ptr(value) }.to_string_lossy().into_owned();
        let mut free_status = 0;
        unsafe {
            sys::fffree(value.cast(), &mut free_status);
        }
        text
    };

    match status {
        0 => Ok(text),
        _ => Err(status_error(key, status)),
    }
}

/// Writes or replaces `key` on the current HDU.
///
/// Trailing blanks of a FITS string are not significant and are lost on read, so
/// such values are refused instead of being silently altered.
pub(crate) fn write_key(fptr: &mut FitsFile, key: &str, value: &HeaderValue) -> Result<()> {
    let c_key = c_string(key)?;
    let no_comment = c"";
    let mut status = 0;

    match value {
        HeaderValue::Str(s) => {
            if s.ends_with(' ') {
                return Err(CalibError::EncodeError(format!(
                    "{key}: value '{s}' has trailing blanks, which FITS strings cannot hold"
                )));
            }
            let c_value = c_string(s)?;
            // SAFETY: all strings are nul-terminated and outlive the call.
            unsafe {
                sys::ffukls(
                    fptr.as_raw(),
                    c_key.as_ptr().cast_mut(),
                    c_value.as_ptr().cast_mut(),
                    no_comment.as_ptr().cast_mut(),
                    &mut status,
                );
            }
        }
        HeaderValue::Int(i) => unsafe {
            sys::ffukyj(
                fptr.as_raw(),
                c_key.as_ptr().cast_mut(),
                *i,
                no_comment.as_ptr().cast_mut(),
                &mut status,
            );
        },
        HeaderValue::Float(f) => unsafe {
            sys::ffukyd(
                fptr.as_raw(),
                c_key.as_ptr().cast_mut(),
                *f,
                FLOAT_DIGITS,
                no_comment.as_ptr().cast_mut(),
                &mut status,
            );
        },
    }

    match status {
        0 => Ok(()),
        _ => Err(status_error(key, status)),
    }
}

fn c_string(value: &str) -> Result<CString> {
    CString::new(value)
        .map_err(|_| CalibError::EncodeError(format!("'{value}' contains a nul byte")))
}

fn status_error(key: &str, status: c_int) -> CalibError {
    CalibError::FitsStatus {
        key: key.to_string(),
        status,
    }
}
