//! Delimited serialization of scored arc lines.
//!
//! The table is CSV with columns `Ion,wave,score,RelInt`, preceded by `#`
//! metadata lines recording how it was produced.

use std::io::{Read, Write};

use crate::calib_pipeline::arc_lines::types::{ArcLineConfig, Camera, ScoredLine};
use crate::calib_pipeline::common::error::Result;

/// Name recorded in the `generator` metadata line.
pub const GENERATOR: &str = "desi_generate_arc_line_list";

pub fn write_arc_line_list(
    lines: &[ScoredLine],
    config: &ArcLineConfig,
    output: &mut dyn Write,
) -> Result<()> {
    let ngood = lines.iter().filter(|l| l.score == config.good_score).count();
    writeln!(output, "# generator: {GENERATOR}")?;
    writeln!(output, "# version: {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(output, "# tolerance: {}", config.tolerance)?;
    let cameras: Vec<String> = config.cameras.iter().map(Camera::to_string).collect();
    writeln!(output, "# cameras: {}", cameras.join(","))?;
    writeln!(output, "# nlines: {}", lines.len())?;
    writeln!(output, "# ngood: {ngood}")?;

    let mut wtr = csv::Writer::from_writer(output);
    for line in lines {
        wtr.serialize(line)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Reads back a table written by [`write_arc_line_list`], skipping metadata.
pub fn read_arc_line_list<R: Read>(reader: R) -> Result<Vec<ScoredLine>> {
    let mut rdr = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .from_reader(reader);
    let lines = rdr
        .deserialize()
        .collect::<std::result::Result<Vec<ScoredLine>, csv::Error>>()?;
    Ok(lines)
}
