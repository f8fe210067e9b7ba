//! Verifies simulated k-means kernel output against the golden model.
//!
//! Exits 0 when every centroid coordinate matches within tolerance, 1 on
//! mismatch (with a diagnostic CSV dump).

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use kmeans_verify::artifact::Artifact;
use kmeans_verify::sim::DirSimOutput;
use kmeans_verify::verify::verify;

#[derive(Parser)]
#[command(about = "Verify simulated k-means kernel output against the golden model")]
struct Args {
    /// Directory of raw named output buffers captured from the simulation
    #[arg(long)]
    sim_dir: PathBuf,

    /// Artifact the kernel executed against
    #[arg(long)]
    artifact: PathBuf,

    /// Diagnostic dump path used on mismatch
    #[arg(long, default_value = "kmeans_results.csv")]
    dump: PathBuf,
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> anyhow::Result<ExitCode> {
    init_logging();
    let args = Args::parse();

    let artifact = Artifact::open(&args.artifact)
        .with_context(|| format!("opening artifact {}", args.artifact.display()))?;
    let sim = DirSimOutput::new(&args.sim_dir);

    let outcome = verify(&sim, &artifact, &args.dump)?;
    if outcome.passed {
        info!("centroids match the golden model");
        Ok(ExitCode::SUCCESS)
    } else {
        error!(
            max_relative_err = %format!("{:e}", outcome.max_relative_err()),
            dump = %args.dump.display(),
            "centroids deviate from the golden model"
        );
        Ok(ExitCode::FAILURE)
    }
}
