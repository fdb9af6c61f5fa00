//! strata-batch -- run one scan session from the command line.
//!
//! # Usage
//!
//! ```bash
//! strata-batch --config strata.toml
//! strata-batch -D project.key=shop -D project.modules=core,web --output json
//! strata-batch --config strata.toml --validate
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use strata_batch::cli::{BatchCli, OutputFormat};
use strata_batch::executor::GoalExecutor;
use strata_batch::logging;
use strata_batch::orchestrator::ScanSession;
use strata_core::config::ScanConfig;

const DEFAULT_CONFIG: &str = "strata.toml";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = BatchCli::parse();

    let mut config = load_config(cli.config.as_deref()).await?;
    cli.apply_overrides(&mut config);
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;

    if cli.validate {
        println!("configuration is valid");
        return Ok(());
    }

    logging::init_tracing(&config.general)?;
    strata_core::metrics::describe_all();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        profiling = config.diagnostics.profiling,
        properties = config.properties.len(),
        "strata-batch starting"
    );

    // the session is synchronous; keep it off the async worker threads
    let executor = GoalExecutor::new(cli.goals.clone());
    let summary = tokio::task::spawn_blocking(move || {
        ScanSession::builder().config(config).build()?.run(&executor)
    })
    .await
    .context("scan session task panicked")?
    .map_err(|e| anyhow::anyhow!("scan failed: {}", e))?;

    match cli.output {
        OutputFormat::Text => println!("{summary}"),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }

    tracing::info!("strata-batch finished");
    Ok(())
}

/// Load the configuration file, or fall back to defaults.
///
/// An explicit `--config` path must exist. Without one, `strata.toml` is
/// read when present; otherwise defaults plus environment overrides apply.
async fn load_config(explicit: Option<&Path>) -> Result<ScanConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG);
            if !tokio::fs::try_exists(&default).await.unwrap_or(false) {
                let mut config = ScanConfig::default();
                config.apply_env_overrides();
                return Ok(config);
            }
            default
        }
    };

    ScanConfig::load(&path)
        .await
        .map_err(|e| anyhow::anyhow!("failed to load config {}: {}", path.display(), e))
}
