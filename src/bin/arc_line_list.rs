use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use desi_calib_rs::calib_pipeline::{ArcLineConfig, ArcLineGenerator};
use desi_calib_rs::logger;

use tracing::info;

/// Generate the scored arc-line list used for wavelength calibration
#[derive(Parser, Debug)]
#[command(name = "desi_generate_arc_line_list", version)]
struct Cli {
    /// Master line list (CSV with columns Ion,wave,RelInt)
    #[arg(long)]
    master: PathBuf,

    /// Directory holding goodlines_b.csv, goodlines_r.csv and goodlines_z.csv
    #[arg(long)]
    goodlines_dir: PathBuf,

    /// Output table
    #[arg(long)]
    outfile: PathBuf,

    /// Largest wavelength difference for a master line to match a good line
    #[arg(long, default_value_t = 0.1)]
    tolerance: f64,

    /// Verbose logging
    #[arg(long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    let config = ArcLineConfig::builder().tolerance(cli.tolerance).build();
    let generator = ArcLineGenerator::new(&cli.goodlines_dir, config)?;

    let lines = generator
        .generate_file(&cli.master, &cli.outfile)
        .with_context(|| format!("generating {}", cli.outfile.display()))?;

    info!("Wrote {} lines to {}", lines.len(), cli.outfile.display());
    Ok(())
}
