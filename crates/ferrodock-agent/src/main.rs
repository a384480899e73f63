//! Ferrodock - single-target molecular docking.
//! Entry point for the `ferrodock` binary.

mod output;

use anyhow::Context;
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use ferrodock_config::{Config, ConfigError};
use ferrodock_molecules::pipeline::PipelineProgress;
use ferrodock_molecules::DockingPipeline;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ferrodock=debug,info")),
        )
        .init();

    info!("Ferrodock starting up...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = match Config::load() {
        Ok(c) => {
            info!(
                "Configuration loaded. Target: {} chain {}, ligand {}",
                c.target.pdb_id, c.target.chain, c.target.ligand_resn
            );
            c
        }
        Err(ConfigError::NotFound(path)) => {
            warn!("Could not find {}", path.display());
            warn!("Copy ferrodock.example.toml to ferrodock.toml and edit it.");
            return Ok(());
        }
        Err(e) => return Err(e).context("Failed to load configuration"),
    };

    let (progress_tx, mut progress_rx) = broadcast::channel::<PipelineProgress>(32);
    let progress_log = tokio::spawn(async move {
        loop {
            match progress_rx.recv().await {
                Ok(event) => info!(run_id = %event.run_id, state = ?event.state, "{}", event.message),
                Err(broadcast::error::RecvError::Lagged(n)) => warn!("Progress log skipped {} events", n),
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let pipeline = DockingPipeline::new(config.clone())
        .context("Invalid docking configuration")?
        .with_progress(progress_tx);
    let result = pipeline.run().await;
    drop(pipeline);
    let _ = progress_log.await;

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(failure) => {
            error!(run_id = %failure.run_id, stage = %failure.stage, "{}", failure.cause);
            for artifact in &failure.artifacts {
                info!("Left on disk: {}", artifact.path.display());
            }
            return Err(failure.into());
        }
    };

    for warning in &outcome.warnings {
        warn!("{}", warning);
    }

    let artifacts = outcome.artifact_summaries().await;
    if std::env::var("FERRODOCK_OUTPUT").is_ok_and(|v| v.eq_ignore_ascii_case("json")) {
        let summary = output::RunSummary::new(&config, &outcome, &artifacts);
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("\nDocking results for {} / {}:\n", config.target.pdb_id, config.target.ligand_resn);
    print!("{}", output::pose_table(&outcome.poses));
    println!("\nFiles created:");
    print!("{}", output::artifact_list(&artifacts));

    Ok(())
}
