use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_DIRECTIVE: &str = "profile_scraper=info";

/// Initializes logging: console output on stderr, plus daily-rotated JSON
/// files when `log_dir` is given.
///
/// `RUST_LOG` overrides the default filter. The returned guard must be held
/// until exit so buffered file logs get flushed.
pub fn init_logging(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    // stdout carries exported data, so the console layer writes to stderr
    let console_layer = fmt::layer().with_writer(std::io::stderr);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            if let Err(e) = fs::create_dir_all(dir) {
                eprintln!("Could not create log directory {}: {}", dir.display(), e);
                (None, None)
            } else {
                let file_appender = tracing_appender::rolling::daily(dir, "profile_scraper.log");
                let (writer, guard) = tracing_appender::non_blocking(file_appender);
                (Some(fmt::layer().json().with_writer(writer)), Some(guard))
            }
        }
        None => (None, None),
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init();

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_logging_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");
        let guard = init_logging(Some(log_dir.as_path()));
        assert!(guard.is_some());
        assert!(log_dir.is_dir());
    }
}
