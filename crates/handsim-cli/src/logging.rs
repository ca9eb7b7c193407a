use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::Level;
use tracing_appender::non_blocking::{self, WorkerGuard};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LoggingConfig;

pub struct LoggingGuard {
    _guard: WorkerGuard,
    /// Log file, or `None` when logs go to stderr.
    pub log_path: Option<PathBuf>,
}

/// Install the JSON subscriber when structured logging is enabled.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(logging: &LoggingConfig, run_id: &str) -> Result<Option<LoggingGuard>> {
    if !logging.enable_structured {
        return Ok(None);
    }

    let builder = non_blocking::NonBlockingBuilder::default().lossy(false);
    let (writer, guard) = match &logging.path {
        Some(path) => {
            let dir = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            fs::create_dir_all(&dir)
                .with_context(|| format!("creating log directory at {}", dir.display()))?;
            let file = File::create(path)
                .with_context(|| format!("creating log file at {}", path.display()))?;
            builder.finish(file)
        }
        None => builder.finish(std::io::stderr()),
    };

    let level = logging.level().unwrap_or(Level::INFO);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .json()
        .with_current_span(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(writer)
        .finish();

    // A subscriber may already be installed when running under tests.
    let _ = tracing::subscriber::set_global_default(subscriber);
    tracing::info!(target: "handsim::run", run_id, "structured logging enabled");

    Ok(Some(LoggingGuard {
        _guard: guard,
        log_path: logging.path.clone(),
    }))
}
