// Ridgeline workspace sync runner
//
// Runs one reconciliation of the club workspace against the membership
// roster. `--dry-run` / `--live` override the configured default; with no
// flag the policy file decides.

use std::sync::Arc;

use tracing::{error, info};

use ridgeline_common::Config;
use ridgeline_sync::{JsonFileDirectory, SyncConfigStore, SyncEngine};
use ridgeline_workspace::{WorkspaceAdminPort, WorkspaceConfig, WorkspacePortFactory};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let dry_run_override = parse_dry_run_flag()?;

    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    let workspace_config = WorkspaceConfig::from_env().map_err(|e| {
        error!("Failed to load workspace credentials: {}", e);
        anyhow::anyhow!(e)
    })?;

    let port: Arc<dyn WorkspaceAdminPort> =
        Arc::from(WorkspacePortFactory::create(workspace_config).map_err(|e| {
            error!("Failed to create workspace port: {}", e);
            anyhow::anyhow!(e)
        })?);

    let engine = SyncEngine::new(
        SyncConfigStore::new(&config.sync_config_path),
        Arc::new(JsonFileDirectory::new(&config.membership_roster_path)),
        port,
    );

    info!("Starting workspace sync");
    let result = engine.run(dry_run_override).await;

    info!("{}", result.summary());
    for (index, message) in result.errors.iter().enumerate() {
        error!("sync error {}: {}", index + 1, message);
    }

    println!("{}", serde_json::to_string_pretty(&result)?);

    if result.errors.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("sync completed with {} error(s)", result.errors.len())
    }
}

fn parse_dry_run_flag() -> anyhow::Result<Option<bool>> {
    let mut dry_run_override = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--dry-run" => dry_run_override = Some(true),
            "--live" => dry_run_override = Some(false),
            other => anyhow::bail!("unknown argument: {} (expected --dry-run or --live)", other),
        }
    }
    Ok(dry_run_override)
}
