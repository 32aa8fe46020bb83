use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE_PREFIX: &str = "nerevar.log";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

pub fn init_logging() {
    let _ = fmt().with_env_filter(env_filter()).try_init();
}

/// Logs to a daily-rolled file in `dir`. Keep the guard alive for the lifetime
/// of the process or buffered lines are lost on exit.
pub fn init_file_logging(dir: &Path) -> std::io::Result<WorkerGuard> {
    std::fs::create_dir_all(dir)?;
    let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = fmt()
        .with_writer(writer)
        .with_env_filter(env_filter())
        .with_ansi(false)
        .try_init();
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_logging_creates_log_dir() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("logs");
        let guard = init_file_logging(&logs).unwrap();
        tracing::info!("file logging test line");
        drop(guard);
        assert!(logs.is_dir());
    }
}
