use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::calib_pipeline::arc_lines::types::Camera;
use crate::calib_pipeline::common::error::{CalibError, Result};

/// Curated known-good line wavelengths per camera.
pub trait GoodLineSource {
    fn good_lines(&self, camera: Camera) -> Result<Vec<f64>>;
}

#[derive(Deserialize)]
struct GoodLineRecord {
    wave: f64,
}

/// Reads `goodlines_<camera>.csv` files from a directory. Each file needs a
/// `wave` column; other columns are ignored.
pub struct DirGoodLineSource {
    dir: PathBuf,
}

impl DirGoodLineSource {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, camera: Camera) -> PathBuf {
        self.dir.join(format!("goodlines_{camera}.csv"))
    }
}

impl GoodLineSource for DirGoodLineSource {
    fn good_lines(&self, camera: Camera) -> Result<Vec<f64>> {
        let path = self.path_for(camera);
        let file = File::open(&path)
            .map_err(|e| CalibError::InputReadError(format!("{}: {}", path.display(), e)))?;
        let mut rdr = csv::ReaderBuilder::new()
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_reader(file);
        let waves = rdr
            .deserialize::<GoodLineRecord>()
            .map(|record| record.map(|r| r.wave))
            .collect::<std::result::Result<Vec<_>, csv::Error>>()?;
        debug!("Loaded {} good lines for camera {}", waves.len(), camera);
        Ok(waves)
    }
}
