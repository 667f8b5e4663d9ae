use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// `LogKind` represents where the `tracing` events end up.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LogKind {
    /// It logs to console, the default choice.
    Stdout,

    /// It logs on a file in <temp dir>/arm7-cycle-<timestamp>.log
    File,
}

/// Keeps the file writer alive. Buffered events are flushed when it drops.
#[derive(Debug)]
pub struct LoggerGuard {
    path: Option<PathBuf>,
    _guard: Option<WorkerGuard>,
}

impl LoggerGuard {
    /// The log file, for [`LogKind::File`].
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// Installs the global subscriber, filtered by `RUST_LOG` or `info`.
#[must_use]
pub fn init_logger(kind: LogKind) -> LoggerGuard {
    init_logger_with_filter(kind, "info")
}

/// Like [`init_logger`], with `fallback` used when `RUST_LOG` is unset.
/// A subscriber installed earlier stays in place.
#[must_use]
pub fn init_logger_with_filter(kind: LogKind, fallback: &str) -> LoggerGuard {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match kind {
        LogKind::Stdout => {
            builder.try_init().ok();
            LoggerGuard {
                path: None,
                _guard: None,
            }
        }
        LogKind::File => {
            let filename = format!("arm7-cycle-{}.log", Utc::now().timestamp());
            let dir = std::env::temp_dir();
            let path = dir.join(&filename);
            println!("Logging to file: {}", path.display());

            let appender = tracing_appender::rolling::never(dir, filename);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            builder.with_writer(writer).with_ansi(false).try_init().ok();

            LoggerGuard {
                path: Some(path),
                _guard: Some(guard),
            }
        }
    }
}
