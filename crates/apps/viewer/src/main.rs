mod config;
mod error;
mod loader;
mod pipeline;
mod summary;

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::{Args, DataRoot};
use crate::error::ViewerError;
use crate::loader::DatasetSource;
use crate::pipeline::build_scene;
use crate::summary::SceneSummary;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), ViewerError> {
    let source = DatasetSource::new(DataRoot::parse(&args.root));
    let manifest = source.manifest().await?;
    let options = args.pipeline_options(manifest.fov_deg);
    info!(
        root = %source.root(),
        datasets = manifest.datasets.len(),
        fov_deg = options.fov_deg,
        "building scene"
    );

    let build = build_scene(&source, &manifest, &options).await?;
    for report in &build.reports {
        info!(
            layer = report.name,
            emitted = report.primitives_emitted,
            skipped_features = report.features_skipped,
            skipped_positions = report.positions_skipped,
            "layer done"
        );
    }
    if !build.failures.is_empty() {
        error!(failed = build.failures.len(), "some datasets were not drawn");
    }

    let summary = SceneSummary::from_build(&build, &manifest, args.dump_primitives);
    summary.write(args.out.as_deref()).await
}
