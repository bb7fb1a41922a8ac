use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::calib_pipeline::arc_lines::types::MasterLine;
use crate::calib_pipeline::common::error::{CalibError, Result};

/// Loads the master line list from a CSV file with columns `Ion,wave,RelInt`.
pub fn load_master_list<P: AsRef<Path>>(path: P) -> Result<Vec<MasterLine>> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| CalibError::InputReadError(format!("{}: {}", path.display(), e)))?;
    let lines = read_master_list(file)?;
    debug!("Loaded {} master lines from {}", lines.len(), path.display());
    Ok(lines)
}

pub fn read_master_list<R: Read>(reader: R) -> Result<Vec<MasterLine>> {
    let mut rdr = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut lines = Vec::new();
    for result in rdr.deserialize() {
        let line: MasterLine = result?;
        lines.push(line);
    }
    Ok(lines)
}
