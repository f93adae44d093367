use std::path::PathBuf;

use tracing::subscriber::set_global_default;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_log::LogTracer;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

use crate::configuration::project_dirs;

/// Directory the rolling log files are written to
pub fn log_dir() -> PathBuf {
    project_dirs()
        .map(|d| d.data_local_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Install the global subscriber: stderr output plus a daily rolling file.
/// `RUST_LOG` overrides `env_filter` when set. Keep the returned guard alive
/// for the life of the process or buffered file output is lost.
pub fn init_subscriber(name: &str, env_filter: &str) -> WorkerGuard {
    let log_bridge = LogTracer::init();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter));

    let formatting_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .pretty();

    let file_appender = tracing_appender::rolling::daily(log_dir(), format!("{}.log", name));
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_writer(non_blocking);

    let subscriber = Registry::default()
        .with(env_filter)
        .with(formatting_layer)
        .with(file_layer);

    if set_global_default(subscriber).is_err() {
        tracing::warn!("global tracing subscriber already set");
    }
    if let Err(e) = log_bridge {
        tracing::debug!(error = %e, "log bridge already installed");
    }

    guard
}
