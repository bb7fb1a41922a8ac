//! Downstream propagation of bad pixels along the readout.
//!
//! Charge clocked through a defect can be corrupted on its way to the amplifier,
//! so pixels read after enough bad pixels in the same column are masked too.

use ndarray::{Array2, s};

use crate::calib_pipeline::dead_mask::amplifier::AmplifierRegion;

/// Per-pixel propagation statistics kept for debug output.
#[derive(Debug, Clone)]
pub struct DownstreamTrace {
    /// Fraction of bad pixels among those read earlier in the column
    pub bad_fraction: Array2<f64>,
    /// Whether any pixel read earlier in the column was bad
    pub any_bad: Array2<bool>,
}

impl DownstreamTrace {
    pub fn new(shape: (usize, usize)) -> Self {
        Self {
            bad_fraction: Array2::zeros(shape),
            any_bad: Array2::from_elem(shape, false),
        }
    }
}

/// Flags good pixels of `region` whose column already had a bad pixel read
/// before them and whose earlier-read bad fraction exceeds `frac_threshold`.
///
/// Statistics are taken from the region as it stood on entry, so the pass only
/// ever adds flags. Returns the number of pixels flagged.
pub fn propagate_downstream(
    badness: &mut Array2<u8>,
    region: &AmplifierRegion,
    frac_threshold: f64,
    mut trace: Option<&mut DownstreamTrace>,
) -> usize {
    let rows = region.section.rows.clone();
    let cols = region.section.cols.clone();
    let mut window = badness.slice_mut(s![rows.clone(), cols.clone()]);
    let before = window.to_owned();
    let mut added = 0;

    for (j, column) in before.columns().into_iter().enumerate() {
        let mut nread = 0usize;
        let mut nbad = 0usize;
        for i in region.direction.order(column.len()) {
            let fraction = if nread > 0 { nbad as f64 / nread as f64 } else { 0.0 };
            let any_bad = nbad > 0;

            if let Some(trace) = trace.as_deref_mut() {
                trace.bad_fraction[[rows.start + i, cols.start + j]] = fraction;
                trace.any_bad[[rows.start + i, cols.start + j]] = any_bad;
            }

            let is_bad = column[i] > 0;
            if !is_bad && any_bad && fraction > frac_threshold {
                window[[i, j]] += 1;
                added += 1;
            }

            nread += 1;
            if is_bad {
                nbad += 1;
            }
        }
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calib_pipeline::dead_mask::amplifier::{AmpName, ReadoutDirection, Section};
    use ndarray::array;

    fn region(
        rows: std::ops::Range<usize>,
        cols: std::ops::Range<usize>,
        amp: AmpName,
    ) -> AmplifierRegion {
        AmplifierRegion {
            amp,
            section: Section { rows, cols },
            direction: amp.readout_direction(),
        }
    }

    #[test]
    fn test_single_bad_pixel_forward() {
        let mut badness = Array2::<u8>::zeros((6, 1));
        badness[[0, 0]] = 1;
        let added = propagate_downstream(&mut badness, &region(0..6, 0..1, AmpName::A), 0.3, None);
        // fractions read after the defect: 1/1, 1/2, 1/3, 1/4, 1/5
        assert_eq!(badness.column(0).to_vec(), vec![1, 1, 1, 1, 0, 0]);
        assert_eq!(added, 3);
    }

    #[test]
    fn test_upstream_pixels_never_flagged() {
        let mut badness = Array2::<u8>::zeros((6, 1));
        badness[[3, 0]] = 1;
        propagate_downstream(&mut badness, &region(0..6, 0..1, AmpName::B), 0.3, None);
        assert_eq!(badness.column(0).to_vec(), vec![0, 0, 0, 1, 0, 0]);
    }

    #[test]
    fn test_reverse_direction() {
        let mut badness = Array2::<u8>::zeros((4, 1));
        badness[[3, 0]] = 1;
        let region = region(0..4, 0..1, AmpName::C);
        assert_eq!(region.direction, ReadoutDirection::Reverse);
        propagate_downstream(&mut badness, &region, 0.3, None);
        assert_eq!(badness.column(0).to_vec(), vec![0, 1, 1, 1]);
    }

    #[test]
    fn test_only_adds_flags() {
        let before = array![
            [1u8, 0, 0, 1],
            [0, 1, 0, 0],
            [0, 0, 0, 1],
            [1, 0, 1, 0],
            [0, 0, 0, 0],
        ];
        for amp in [AmpName::A, AmpName::D] {
            let mut after = before.clone();
            propagate_downstream(&mut after, &region(0..5, 0..4, amp), 0.3, None);
            assert!(before.iter().zip(after.iter()).all(|(&b, &a)| a >= b && (b == 0 || a == b)));
        }
    }

    #[test]
    fn test_region_confinement_and_trace() {
        let mut badness = Array2::<u8>::zeros((4, 4));
        badness[[0, 1]] = 1;
        badness[[0, 3]] = 1;
        let mut trace = DownstreamTrace::new((4, 4));
        propagate_downstream(&mut badness, &region(0..4, 0..2, AmpName::A), 0.3, Some(&mut trace));

        // column 3 lies outside the region
        assert_eq!(badness.column(3).to_vec(), vec![1, 0, 0, 0]);
        assert_eq!(badness.column(1).to_vec(), vec![1, 1, 1, 1]);
        assert_eq!(trace.bad_fraction[[2, 1]], 0.5);
        assert!(trace.any_bad[[1, 1]]);
        assert!(!trace.any_bad[[0, 1]]);
        assert!(!trace.any_bad[[3, 0]]);
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut badness = array![[1u8], [0], [0]];
        propagate_downstream(&mut badness, &region(0..3, 0..1, AmpName::A), 0.5, None);
        // row 2 sees exactly 1/2, which does not exceed 0.5
        assert_eq!(badness.column(0).to_vec(), vec![1, 1, 0]);
    }
}
