use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use filedrop_core::Environment;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is not set.
pub fn default_filter(environment: Environment) -> &'static str {
    match environment {
        Environment::Development => "filedrop=debug,tower_http=debug",
        Environment::Production => "filedrop=info,tower_http=info",
    }
}

/// Initialize the global tracing subscriber.
pub fn init_telemetry(environment: Environment, log_file: &Path) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(environment).into());

    match environment {
        Environment::Development => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().compact())
                .try_init()
                .context("Failed to install tracing subscriber")?;
        }
        Environment::Production => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file)
                .with_context(|| format!("Failed to open log file {}", log_file.display()))?;

            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .try_init()
                .context("Failed to install tracing subscriber")?;
        }
    }

    tracing::info!(environment = %environment, "Tracing initialized");
    Ok(())
}
