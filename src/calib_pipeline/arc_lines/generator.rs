use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{debug, info, instrument};

use crate::calib_pipeline::arc_lines::{
    goodlines::{DirGoodLineSource, GoodLineSource},
    master::load_master_list,
    types::{ArcLineConfig, MasterLine, ScoredLine},
    writer::write_arc_line_list,
};
use crate::calib_pipeline::common::error::{CalibError, Result};

pub struct ArcLineGenerator<S: GoodLineSource> {
    source: S,
    config: ArcLineConfig,
}

impl ArcLineGenerator<DirGoodLineSource> {
    pub fn new<P: AsRef<Path>>(goodlines_dir: P, config: ArcLineConfig) -> Result<Self> {
        Self::with_custom(DirGoodLineSource::new(goodlines_dir), config)
    }
}

impl<S: GoodLineSource> ArcLineGenerator<S> {
    pub fn with_custom(source: S, config: ArcLineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { source, config })
    }

    /// Scores every master line.
    ///
    /// Each good line upgrades at most one master line: the nearest one, taking
    /// the first on ties, provided it lies strictly within the tolerance.
    pub fn score(&self, master: &[MasterLine]) -> Result<Vec<ScoredLine>> {
        let mut scores = vec![self.config.default_score; master.len()];

        for &camera in &self.config.cameras {
            let good = self.source.good_lines(camera)?;
            let mut matched = 0;
            for wave in good {
                let Some((index, distance)) = nearest(master, wave) else {
                    continue;
                };
                if distance < self.config.tolerance {
                    scores[index] = self.config.good_score;
                    matched += 1;
                } else {
                    debug!(camera = %camera, wave, distance, "Good line has no master counterpart");
                }
            }
            info!(camera = %camera, matched, "Matched good lines");
        }

        Ok(master
            .iter()
            .zip(scores)
            .map(|(line, score)| ScoredLine {
                ion: line.ion.clone(),
                wave: line.wave,
                score,
                rel_int: line.rel_int,
            })
            .collect())
    }

    pub fn write(&self, lines: &[ScoredLine], output: &mut dyn Write) -> Result<()> {
        write_arc_line_list(lines, &self.config, output)
    }

    /// Loads the master list, scores it and writes the result to `outfile`.
    #[instrument(skip(self, master_path, outfile))]
    pub fn generate_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        master_path: P,
        outfile: Q,
    ) -> Result<Vec<ScoredLine>> {
        let master_path = master_path.as_ref();
        let outfile = outfile.as_ref();

        info!(master = %master_path.display(), "Loading master line list");
        let master = load_master_list(master_path)?;
        let lines = self.score(&master)?;

        let mut output = File::create(outfile)
            .map(BufWriter::new)
            .map_err(|e| CalibError::OutputWriteError(format!("{}: {}", outfile.display(), e)))?;
        self.write(&lines, &mut output)?;
        output.flush()?;

        info!(
            output = %outfile.display(),
            nlines = lines.len(),
            ngood = lines.iter().filter(|l| l.score == self.config.good_score).count(),
            "Wrote arc line list"
        );
        Ok(lines)
    }

    pub fn config(&self) -> &ArcLineConfig {
        &self.config
    }
}

/// Index of the master line closest to `wave` and its distance.
///
/// Lines without a finite wavelength never match.
fn nearest(master: &[MasterLine], wave: f64) -> Option<(usize, f64)> {
    master
        .iter()
        .map(|line| (line.wave - wave).abs())
        .enumerate()
        .filter(|(_, distance)| distance.is_finite())
        .fold(None, |best, (index, distance)| match best {
            Some((_, best_distance)) if best_distance <= distance => best,
            _ => Some((index, distance)),
        })
}
