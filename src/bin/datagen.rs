//! Generates the k-means test-vector artifact from a parameter config file.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};

use kmeans_verify::config::GenParams;
use kmeans_verify::datagen::generate;

#[derive(Parser)]
#[command(about = "Generate k-means kernel test vectors")]
struct Args {
    /// Parameter config file (JSON)
    #[arg(short = 'c', long)]
    cfg: PathBuf,

    /// Section to store the arrays in, passed through to the artifact
    #[arg(long)]
    section: Option<String>,

    /// Run without visualization
    #[arg(long)]
    no_gui: bool,

    /// Where to write the artifact
    #[arg(short, long)]
    output: PathBuf,
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let args = Args::parse();

    let mut params = GenParams::from_file(&args.cfg)
        .with_context(|| format!("loading config {}", args.cfg.display()))?;
    if args.section.is_some() {
        params.section = args.section;
    }
    params.no_gui |= args.no_gui;
    if !params.no_gui {
        debug!("visualization is not handled here, continuing without it");
    }

    info!(
        n_samples = params.n_samples,
        n_features = params.n_features,
        n_clusters = params.n_clusters,
        max_iter = params.max_iter,
        seed = params.seed,
        "generating test vectors"
    );
    let vectors = generate(&params)?;
    vectors
        .write_artifact(&args.output)
        .with_context(|| format!("writing artifact {}", args.output.display()))?;
    Ok(())
}
