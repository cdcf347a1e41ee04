//! Tracing setup: console on stderr, optional JSON-lines file.

use std::path::Path;

use eyre::WrapErr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

/// Install the global subscriber. Keep the returned guard alive until exit so
/// buffered file lines get flushed.
pub fn init(
    json: bool,
    level: &str,
    logging: &lift_config::Logging,
) -> eyre::Result<Option<WorkerGuard>> {
    // RUST_LOG wins over --log-level / [logging].level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .wrap_err_with(|| format!("invalid log level {level:?}"))?;

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    if json {
        layers.push(fmt::layer().json().with_writer(std::io::stderr).boxed());
    } else {
        layers.push(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .boxed(),
        );
    }

    let mut guard = None;
    if let Some(file) = logging.file.as_deref() {
        let path = Path::new(file);
        let dir = path
            .parent()
            .filter(|d| !d.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .ok_or_else(|| eyre::eyre!("logging.file {file:?} has no file name"))?;
        let appender = match logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, g) = tracing_appender::non_blocking(appender);
        guard = Some(g);
        layers.push(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .boxed(),
        );
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| eyre::eyre!("init tracing: {e}"))?;
    Ok(guard)
}
