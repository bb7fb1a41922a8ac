//! Arc-line list module
//!
//! Scores a master list of arc-lamp emission lines by whether each line is a
//! curated known-good line in any spectrograph camera, and serializes the result.

mod generator;
mod goodlines;
mod master;
pub mod types;
mod writer;


pub use generator::ArcLineGenerator;
pub use goodlines::{DirGoodLineSource, GoodLineSource};
pub use master::{load_master_list, read_master_list};
pub use types::{ArcLineConfig, ArcLineConfigBuilder, Camera, MasterLine, ScoredLine};
pub use writer::{read_arc_line_list, write_arc_line_list};
