//! Console logging plus one audit log file per user attempt

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::Dispatch;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{Layer, Registry, fmt};

fn console_level(quiet: bool) -> LevelFilter {
    if quiet { LevelFilter::ERROR } else { LevelFilter::INFO }
}

/// Installs the process-wide console subscriber
pub fn init_console(quiet: bool) {
    tracing_subscriber::fmt()
        .with_max_level(console_level(quiet))
        .init();
}

/// Subscriber for one user's attempt: console output at the run's level,
/// and everything down to DEBUG appended to `{log_dir}/{user}.log`
/// regardless of `quiet`.
///
/// # Errors
///
/// Fails if the log directory or file cannot be created.
pub fn attempt_dispatch(user: &str, log_dir: &Path, quiet: bool) -> Result<Dispatch> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log dir {}", log_dir.display()))?;

    let path = log_dir.join(format!("{user}.log"));
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let subscriber = Registry::default()
        .with(fmt::layer().with_filter(console_level(quiet)))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .with_filter(LevelFilter::DEBUG),
        );

    Ok(Dispatch::new(subscriber))
}
