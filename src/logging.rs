use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE: &str = "tango.log";

/// Route `tracing` output to `log_dir/tango.log`; the terminal belongs to
/// the UI. Filter with `RUST_LOG`, default `tango=info`.
///
/// Keep the returned guard alive until exit so buffered lines are flushed.
pub fn init_logging(log_dir: &Path) -> std::io::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;
    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tango=info"));
    let _ = tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_env_filter(filter)
        .try_init();

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn creates_log_dir() {
        let dir = tempdir().unwrap();
        let log_dir = dir.path().join("state");
        let guard = init_logging(&log_dir).unwrap();
        tracing::info!("hello from the test");
        drop(guard);
        assert!(log_dir.is_dir());
    }
}
