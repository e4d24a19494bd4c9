//! `regate` binary — batch driver for respiratory-gated reconstructions.
//!
//! # Usage
//!
//! ```bash
//! regate /data/subject01/encode_0 --config recon.yaml --output-dir /data/subject01/recon
//! ```
//!
//! Every strategy listed in the configuration is run against the same
//! input arrays; a failing strategy is logged and skipped so one bad
//! configuration does not abort the whole batch.

use camino::Utf8PathBuf;
use clap::Parser;
use tracing::{error, info, info_span};

use regate::config::ReconConfig;
use regate::dataloader::load_dataset;
use regate::recon::{GatingStrategy, Recon, ReconInputs};
use regate::regate_errors::RegateError;
use regate::volume::save_nifti;

/// Command-line arguments for the reconstruction driver.
#[derive(Parser, Debug)]
#[command(
    name = "regate",
    version,
    about = "Respiratory-gated 3D MRI reconstruction",
    long_about = None
)]
struct Args {
    /// Directory containing the preprocessed .npy input arrays.
    data_dir: Utf8PathBuf,

    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE")]
    config: Utf8PathBuf,

    /// Directory the reconstructed volumes are written to.
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    output_dir: Utf8PathBuf,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() {
    let args = Args::parse();

    let log_level_filter = args
        .log_level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .unwrap_or(tracing_subscriber::filter::LevelFilter::INFO);

    tracing_subscriber::fmt()
        .with_max_level(log_level_filter)
        .with_target(false)
        .init();

    match run(&args) {
        Ok(failed) if failed == 0 => {}
        Ok(failed) => {
            error!(failed, "batch finished with failed strategies");
            std::process::exit(1);
        }
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    }
}

/// Run every configured strategy; returns the number of failures.
fn run(args: &Args) -> Result<usize, RegateError> {
    let config = ReconConfig::from_yaml(&args.config)?;
    let data = load_dataset(&args.data_dir)?;

    std::fs::create_dir_all(&args.output_dir)?;

    let inputs = ReconInputs {
        ksp: data.ksp.view(),
        coord: data.coord.view(),
        dcf: data.dcf.view(),
        resp: Some(data.resp.view()),
    };

    let mut failed = 0;
    for name in &config.strategies {
        let span = info_span!("recon", strategy = %name);
        let _guard = span.enter();

        let outcome = GatingStrategy::from_config(name, &config)
            .and_then(|strategy| strategy.run(&inputs));

        match outcome {
            Ok(volume) => {
                let path = save_nifti(&volume, name, &args.output_dir)?;
                info!(%path, "reconstruction finished");
            }
            Err(e) => {
                // One strategy's failure does not abort the batch.
                error!("reconstruction failed: {e}");
                failed += 1;
            }
        }
    }

    Ok(failed)
}
