use std::fs::OpenOptions;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Env var holding an EnvFilter directive for the stderr layer
pub const LOG_FILTER_ENV: &str = "WORKDESK_LOG";
/// Env var naming a file that receives DEBUG-level logs
pub const LOG_FILE_ENV: &str = "WORKDESK_LOG_FILE";

pub fn init_tracing() {
    let stderr_filter = EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    // stdout belongs to the shell
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(stderr_filter);

    let registry = tracing_subscriber::registry().with(stderr_layer);

    let file = std::env::var(LOG_FILE_ENV)
        .ok()
        .and_then(|path| match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => Some((path, file)),
            Err(e) => {
                eprintln!("Could not open log file {}: {}", path, e);
                None
            }
        });

    if let Some((path, file)) = file {
        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(true)
            .with_filter(tracing_subscriber::filter::LevelFilter::DEBUG);

        // try_init: a second call (e.g. from tests) is a no-op
        let _ = registry.with(file_layer).try_init();
        eprintln!("File logging enabled: {}", path);
    } else {
        let _ = registry.try_init();
    }
}
