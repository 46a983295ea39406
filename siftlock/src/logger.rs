// siftlock/src/logger.rs
//! Logger bootstrap for the CLI. Respects `RUST_LOG` unless the caller
//! forces a level (e.g. `--quiet` / `--debug`).

use env_logger::Builder;
use log::LevelFilter;

/// Initializes the global logger. A `Some` level overrides `RUST_LOG`;
/// `None` falls back to the environment with a `warn` default.
pub fn init_logger(level: Option<LevelFilter>) {
    let mut builder = Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(level) = level {
        builder.filter_level(level);
    }
    // Tests may initialize more than once.
    let _ = builder.format_timestamp_secs().try_init();
}
