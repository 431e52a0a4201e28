//! Tracing subscriber setup for binaries and tests embedding the crate.

use crate::config::Settings;
use tracing_subscriber::EnvFilter;

/// Installs a global `fmt` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `settings.logging.level` is used
/// (forced to `debug` when `settings.debug` is on). Returns `false` if a
/// global subscriber was already installed.
pub fn init_logging(settings: &Settings) -> bool {
    let fallback = if settings.debug {
        "debug"
    } else {
        settings.logging.level.as_str()
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_target(false)
        .try_init()
        .is_ok()
}
