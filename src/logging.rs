//! Logging setup for the binaries using `tracing` + `tracing-subscriber`.
//!
//! The filter comes from `SCHEDULE_ENGINE_LOG` (any `EnvFilter` directive,
//! e.g. `debug` or `schedule_engine::calculations=trace`), falling back to
//! `info`. Logs go to stderr so stdout stays free for command output.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

pub const LOG_ENV: &str = "SCHEDULE_ENGINE_LOG";

/// Install the global subscriber. Later calls are ignored.
pub fn init_logging(default_directive: Option<&str>) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default_directive.unwrap_or("info")))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
