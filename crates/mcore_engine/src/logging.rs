//! Log output for embedding hosts

use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directives
pub const LOG_ENV: &str = "MCORE_LOG";

/// Install a stderr subscriber filtered by `MCORE_LOG`, `warn` when unset.
///
/// Returns false if a global subscriber was already installed, by this
/// function or by the host.
pub fn init() -> bool {
    init_with_default("warn")
}

pub fn init_with_default(default_directives: &str) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directives));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .is_ok()
}
