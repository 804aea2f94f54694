use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Where log lines go for the lifetime of the process
pub enum LogTarget {
    Stderr,
    /// The dashboard owns stdout/stderr while it runs
    File,
}

fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the global subscriber. `RUST_LOG` wins over `LOG_LEVEL`.
pub fn init(config: &Config, target: LogTarget) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(filter(&config.log_level));

    match target {
        LogTarget::Stderr => builder
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {}", e))?,
        LogTarget::File => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&config.log_file)?;
            builder
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init()
                .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {}", e))?
        }
    }

    Ok(())
}

/// Logging for commands that run before (or without) a full `Config`
pub fn init_default() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter("info"))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
