use std::fs;
use std::path::Path;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initializes the logging system with both console and file output.
pub fn init_logging(log_dir: &Path, job_type: &str) {
    // Ensure logs directory exists
    let _ = fs::create_dir_all(log_dir);

    // One rolling file per job type so stage logs stay separate
    let file_appender = tracing_appender::rolling::daily(log_dir, format!("{}.log", job_type));
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer().json().with_writer(non_blocking_writer);

    let console_layer = fmt::layer().with_target(false).with_writer(std::io::stdout);

    // Respect RUST_LOG if set
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("airbnb_pipeline=info,info"));

    // A second init in the same process (tests) is not an error
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init();

    // The guard must outlive the process so buffered lines are flushed
    std::mem::forget(guard);
}
