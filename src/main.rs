use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use desi_calib_rs::calib_pipeline::{DeadMaskConfig, DeadPixelMaskBuilder};
use desi_calib_rs::logger;

use tracing::{error, info};

/// Compute a dead pixel mask from preprocessed dark images
#[derive(Parser, Debug)]
#[command(name = "desi_compute_dead_pixel_mask", version)]
struct Cli {
    /// Preprocessed dark image file(s)
    #[arg(long, num_args = 1.., required = true)]
    infile: Vec<PathBuf>,

    /// Output mask file
    #[arg(long)]
    outfile: PathBuf,

    /// Write intermediate grids next to the output file
    #[arg(long)]
    debug: bool,

    /// Mask pixels read out after a fraction of bad pixels above this in the same column
    #[arg(long, default_value_t = 0.3)]
    frac_downstream_mask: f64,

    /// Significance threshold, in units of the per-pixel standard deviation
    #[arg(long, default_value_t = 3.0)]
    nsig: f64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init(cli.debug);

    info!("Starting dead pixel mask computation...");

    let config = DeadMaskConfig::builder()
        .nsig(cli.nsig)
        .frac_downstream_mask(cli.frac_downstream_mask)
        .debug(cli.debug)
        .build();
    let builder = DeadPixelMaskBuilder::new(config).context("invalid configuration")?;

    info!("nsig: {}", builder.config().nsig);
    info!("Downstream mask fraction: {}", builder.config().frac_downstream_mask);

    match builder.build_files(&cli.infile, &cli.outfile) {
        Ok(result) => {
            info!(
                "Masked {} pixels ({} by significance, {} downstream)",
                result.output.ndead, result.n_initial, result.n_downstream
            );
            Ok(())
        }
        Err(e) => {
            error!("Dead pixel mask failed: {}", e);
            Err(e).with_context(|| format!("writing {}", cli.outfile.display()))
        }
    }
}
