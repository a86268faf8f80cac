//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{error, info, warn};

use super::checks::config_warnings;
use crate::cli::RunArgs;
use crate::error::load_blueprint;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    let mut blueprint = load_blueprint(&args.config)?;

    // CLI overrides
    if args.packed {
        info!("Consuming packed stereo messages (CLI override)");
        blueprint.frontend.subscribe_rgbd = true;
    }
    if args.approx_sync {
        info!("Approximate synchronization enabled (CLI override)");
        blueprint.frontend.approx_sync = true;
    }
    if let Some(rate_hz) = args.rate_hz {
        info!(rate_hz, "Overriding rig rate from CLI");
        blueprint.source.rate_hz = rate_hz;
    }
    config_loader::ConfigLoader::validate(&blueprint)
        .context("Configuration invalid after command line overrides")?;

    info!(
        frame_id = %blueprint.frontend.frame_id,
        sync = blueprint.frontend.sync_policy().as_str(),
        packed = blueprint.frontend.subscribe_rgbd,
        transforms = blueprint.transforms.len(),
        sinks = blueprint.sinks.len(),
        "Configuration loaded"
    );

    for warning in config_warnings(&blueprint) {
        warn!("{warning}");
    }

    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        println!("{}", config_loader::ConfigLoader::to_toml(&blueprint)?);
        return Ok(());
    }

    let pipeline_config = PipelineConfig {
        blueprint,
        max_frames: (args.max_frames > 0).then_some(args.max_frames),
        timeout: (args.timeout > 0).then(|| Duration::from_secs(args.timeout)),
        buffer_size: args.buffer_size,
        metrics_port: (args.metrics_port > 0).then_some(args.metrics_port),
        seed: args.seed,
    };

    info!("Starting pipeline...");
    let stats = Pipeline::new(pipeline_config)
        .run_until(shutdown_signal())
        .await
        .context("Pipeline execution failed")?;

    info!(
        frames_emitted = stats.frontend.frames_emitted,
        frames_dropped = stats.frontend.frames_dropped,
        duration_secs = stats.duration.as_secs_f64(),
        fps = format!("{:.2}", stats.fps()),
        "Pipeline completed"
    );
    stats.print_summary();

    info!("Stereo ingest finished");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
