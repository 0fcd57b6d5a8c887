mod args;
mod commands;
pub mod config;
mod handlers;

pub use args::{Cli, Commands};
pub use commands::run;
pub use config::Config;

use tracing_subscriber::EnvFilter;

/// Install the process-wide tracing subscriber (§10.2): `info` by
/// default, `debug` for this crate's own targets when `INSPECTOR_DEBUG`
/// is set to anything non-empty.
pub fn init_logging() {
    let default_filter = if config::debug_logging_requested() {
        "info,inspector_gateway=debug,inspector_export=debug,inspector_registry=debug,inspector_events=debug,inspector_hooks=debug,inspector_cli=debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
