//! Per-pixel significance of dark exposures.
//!
//! `signal * sqrt(ivar)` expresses a dark pixel in units of its own noise. The
//! median across exposures is robust to a single outlying exposure.

use ndarray::{Array2, Zip};
use tracing::debug;

use crate::calib_pipeline::common::error::{CalibError, Result};
use crate::calib_pipeline::preproc::CalibrationImage;

/// `signal * sqrt(ivar)` for one exposure. Negative inverse variance counts as zero.
pub fn pixel_significance(image: &CalibrationImage) -> Array2<f64> {
    Zip::from(&image.image)
        .and(&image.ivar)
        .map_collect(|&value, &ivar| value * ivar.max(0.0).sqrt())
}

/// Per-pixel median of [`pixel_significance`] across all exposures.
///
/// All exposures must share one shape.
pub fn median_significance(images: &[CalibrationImage]) -> Result<Array2<f64>> {
    let first = images.first().ok_or(CalibError::NoInputs)?;
    let shape = first.shape();

    for image in &images[1..] {
        if image.shape() != shape {
            return Err(CalibError::ShapeMismatch {
                context: image.path.display().to_string(),
                expected: shape,
                found: image.shape(),
            });
        }
    }

    let stack: Vec<Array2<f64>> = images.iter().map(pixel_significance).collect();
    debug!("Stacked {} significance grids of shape {:?}", stack.len(), shape);

    let mut scratch = Vec::with_capacity(stack.len());
    Ok(Array2::from_shape_fn(shape, |index| {
        scratch.clear();
        scratch.extend(stack.iter().map(|grid| grid[index]));
        median(&mut scratch)
    }))
}

/// Median of a non-empty slice; the mean of the two central values for even lengths.
fn median(values: &mut [f64]) -> f64 {
    values.sort_unstable_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        0.5 * (values[mid - 1] + values[mid])
    }
}

/// Marks pixels whose aggregated significance is exactly zero, non-finite,
/// or larger than `nsig` in absolute value.
pub fn initial_badness(significance: &Array2<f64>, nsig: f64) -> Array2<u8> {
    significance.mapv(|s| u8::from(s == 0.0 || !s.is_finite() || s.abs() > nsig))
}
