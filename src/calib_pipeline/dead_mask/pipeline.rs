use std::path::{Path, PathBuf};

use ndarray::Array2;
use tracing::{debug, info, instrument};

use crate::calib_pipeline::{
    common::error::{CalibError, Result},
    dead_mask::{
        DeadMaskConfig, DeadMaskDiagnostics, DeadMaskResult, MAX_INPUTS, OutputMask,
        PipelineTimings, Timer,
        amplifier::regions_from_header,
        propagation::{DownstreamTrace, propagate_downstream},
        significance::{initial_badness, median_significance},
    },
    fits::{FitsHeader, FitsWriter, FitsioWriter, Hdu, ImageData},
    preproc::{CalibrationImage, CalibrationImageReader, FitsPreprocReader},
};

/// Debug grid of the aggregated significance.
pub const DEBUG_SIGNIFICANCE_FILE: &str = "dead-mask-significance.fits";
/// Debug grid of the earlier-read bad fraction.
pub const DEBUG_BAD_FRACTION_FILE: &str = "dead-mask-bad-fraction.fits";
/// Debug grid of the earlier-read any-bad flag.
pub const DEBUG_ANY_BAD_FILE: &str = "dead-mask-any-bad.fits";

pub struct DeadPixelMaskBuilder<R: CalibrationImageReader, W: FitsWriter> {
    reader: R,
    writer: W,
    config: DeadMaskConfig,
}

impl DeadPixelMaskBuilder<FitsPreprocReader, FitsioWriter> {
    pub fn new(config: DeadMaskConfig) -> Result<Self> {
        Self::with_custom(FitsPreprocReader::new(), FitsioWriter, config)
    }
}

impl<R: CalibrationImageReader, W: FitsWriter> DeadPixelMaskBuilder<R, W> {
    pub fn with_custom(reader: R, writer: W, config: DeadMaskConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            reader,
            writer,
            config,
        })
    }

    /// Computes the mask of already loaded exposures.
    ///
    /// The amplifier sections are taken from the header of the first exposure.
    pub fn compute(&self, images: &[CalibrationImage]) -> Result<DeadMaskResult> {
        let mut timings = PipelineTimings::new();
        let result = self.compute_timed(images, &mut timings)?;
        timings.log_summary();
        Ok(result)
    }

    #[instrument(skip_all, fields(n_images = images.len()))]
    fn compute_timed(
        &self,
        images: &[CalibrationImage],
        timings: &mut PipelineTimings,
    ) -> Result<DeadMaskResult> {
        let first = images.first().ok_or(CalibError::NoInputs)?;
        if images.len() > MAX_INPUTS {
            return Err(CalibError::InvalidParameter {
                name: "infile",
                reason: format!("{} inputs, at most {MAX_INPUTS} are supported", images.len()),
            });
        }

        let timer = Timer::start("significance");
        let significance = {
            let _span = tracing::info_span!("median_significance").entered();
            median_significance(images)?
        };
        timings.record(timer);

        let timer = Timer::start("threshold");
        let mut badness = initial_badness(&significance, self.config.nsig);
        let n_initial = count_flagged(&badness);
        timings.record(timer);
        info!(
            nsig = self.config.nsig,
            n_initial,
            "Flagged pixels above significance threshold"
        );

        let regions = regions_from_header(&first.header, first.shape())?;

        let timer = Timer::start("downstream");
        let mut trace = self.config.debug.then(|| DownstreamTrace::new(first.shape()));
        let mut n_downstream = 0;
        for region in &regions {
            let _span = tracing::info_span!("downstream", amp = %region.amp).entered();
            let added = propagate_downstream(
                &mut badness,
                region,
                self.config.frac_downstream_mask,
                trace.as_mut(),
            );
            debug!(amp = %region.amp, direction = ?region.direction, added, "Downstream masking");
            n_downstream += added;
        }
        timings.record(timer);

        let inputs = images
            .iter()
            .map(|image| image.path.display().to_string())
            .collect();
        let output = OutputMask::from_badness(&badness, inputs);

        info!(
            ndead = output.ndead,
            n_downstream,
            frac = self.config.frac_downstream_mask,
            "Dead pixel mask computed"
        );

        let diagnostics = trace.map(|trace| DeadMaskDiagnostics {
            significance,
            bad_fraction: trace.bad_fraction,
            any_bad: trace.any_bad,
        });

        Ok(DeadMaskResult {
            output,
            n_initial,
            n_downstream,
            diagnostics,
        })
    }

    pub fn write_mask(&self, mask: &OutputMask, path: &Path) -> Result<()> {
        self.writer.write_hdus(&[mask.to_hdu()], path)
    }

    /// Writes the three intermediate grids into `dir`; returns the paths written.
    pub fn write_diagnostics(
        &self,
        diagnostics: &DeadMaskDiagnostics,
        dir: &Path,
    ) -> Result<Vec<PathBuf>> {
        let grids = [
            (DEBUG_SIGNIFICANCE_FILE, diagnostics.significance.mapv(|v| v as f32)),
            (DEBUG_BAD_FRACTION_FILE, diagnostics.bad_fraction.mapv(|v| v as f32)),
            (DEBUG_ANY_BAD_FILE, diagnostics.any_bad.mapv(|v| if v { 1.0 } else { 0.0 })),
        ];

        let mut written = Vec::with_capacity(grids.len());
        for (name, grid) in grids {
            let path = dir.join(name);
            let hdu = Hdu::new(FitsHeader::new(), ImageData::F32(grid));
            self.writer.write_hdus(&[hdu], &path)?;
            info!(path = %path.display(), "Wrote debug grid");
            written.push(path);
        }
        Ok(written)
    }

    /// Reads every input, computes the mask and writes it to `outfile`.
    #[instrument(skip(self, inputs, outfile), fields(n_inputs = inputs.len()))]
    pub fn build_files<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        inputs: &[P],
        outfile: Q,
    ) -> Result<DeadMaskResult> {
        let outfile = outfile.as_ref();
        if inputs.is_empty() {
            return Err(CalibError::NoInputs);
        }

        let mut timings = PipelineTimings::new();

        let timer = Timer::start("read");
        let images = {
            let _span = tracing::info_span!("read_inputs").entered();
            inputs
                .iter()
                .map(|path| {
                    let path = path.as_ref();
                    info!(input = %path.display(), "Reading");
                    self.reader.read_image(path)
                })
                .collect::<Result<Vec<_>>>()?
        };
        timings.record(timer);

        let result = self.compute_timed(&images, &mut timings)?;

        let timer = Timer::start("write");
        {
            let _span = tracing::info_span!("write_mask").entered();
            self.write_mask(&result.output, outfile)?;
        }
        info!(output = %outfile.display(), ndead = result.output.ndead, "Wrote dead pixel mask");

        if let Some(diagnostics) = &result.diagnostics {
            let dir = self.debug_dir(outfile);
            self.write_diagnostics(diagnostics, &dir)?;
        }
        timings.record(timer);

        timings.log_summary();
        Ok(result)
    }

    fn debug_dir(&self, outfile: &Path) -> PathBuf {
        match &self.config.debug_dir {
            Some(dir) => dir.clone(),
            None => outfile
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }

    pub fn config(&self) -> &DeadMaskConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: DeadMaskConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }
}

fn count_flagged(badness: &Array2<u8>) -> usize {
    badness.iter().filter(|&&b| b > 0).count()
}
