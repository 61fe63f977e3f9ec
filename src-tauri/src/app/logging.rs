//! Usage: Process-wide tracing setup (env filter, stderr, daily rolling file under the app data dir).

use std::path::PathBuf;
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

const LOG_FILTER_ENV: &str = "APP_SHELL_LOG";
const DEFAULT_LOG_FILTER: &str = "info";
const LOG_DIR_NAME: &str = "logs";
const LOG_FILE_PREFIX: &str = "app-shell";

static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

fn env_filter(raw: Option<String>) -> EnvFilter {
    raw.map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .and_then(|v| EnvFilter::try_new(v).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn log_dir(app: &tauri::AppHandle) -> Result<PathBuf, String> {
    let dir = crate::app_paths::app_data_dir(app)?.join(LOG_DIR_NAME);
    std::fs::create_dir_all(&dir).map_err(|e| format!("failed to create log dir: {e}"))?;
    Ok(dir)
}

fn file_appender(app: &tauri::AppHandle) -> Result<RollingFileAppender, String> {
    let dir = log_dir(app)?;
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .build(&dir)
        .map_err(|e| format!("failed to open log file in {}: {e}", dir.display()))
}

pub(crate) fn init(app: &tauri::AppHandle) {
    let filter = env_filter(std::env::var(LOG_FILTER_ENV).ok());

    let (file_writer, file_error) = match file_appender(app) {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            (Some(writer), None)
        }
        Err(err) => (None, Some(err)),
    };

    let file_layer = file_writer.map(|writer| fmt::layer().with_ansi(false).with_writer(writer));
    let subscriber = Registry::default()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer);

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("tracing init skipped: {err}");
        return;
    }
    if let Err(err) = tracing_log::LogTracer::init() {
        tracing::warn!("log forwarding disabled: {}", err);
    }

    match file_error {
        Some(err) => tracing::warn!("file logging disabled: {}", err),
        None => tracing::debug!("file logging enabled"),
    }
}
