use std::fs::OpenOptions;
use std::sync::Arc;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Timestamped lines to stdout plus a best-effort append-only log file. An
/// unopenable file drops the file layer rather than failing startup.
pub fn init(cfg: &Config) {
    let file = open_log_file(cfg);
    let file_missing = file.is_none();
    let file_layer = file.map(|f| fmt::layer().with_writer(Arc::new(f)).with_ansi(false));

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_level)))
        .with(fmt::layer())
        .with(file_layer)
        .init();

    if file_missing {
        tracing::warn!(
            path = %cfg.log_path.display(),
            "log file could not be opened; logging to stdout only"
        );
    }
}

fn open_log_file(cfg: &Config) -> Option<std::fs::File> {
    if let Some(parent) = cfg.log_path.parent() {
        std::fs::create_dir_all(parent).ok()?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&cfg.log_path)
        .ok()
}
