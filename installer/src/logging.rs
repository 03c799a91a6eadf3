//! Log output for the installer binary.
//!
//! The library reports through the `log` facade; this installs a
//! `tracing-subscriber` formatter on stderr that also receives `log` records.
//! `RUST_LOG` takes precedence over the `-v`/`-q` flags.

use tracing_subscriber::EnvFilter;

/// Default filter directive for the given CLI flags.
pub(crate) fn default_directive(verbosity: u8, quiet: bool) -> &'static str {
    match (quiet, verbosity) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    }
}

/// Install the global subscriber. Later calls are ignored.
pub(crate) fn init_logging(verbosity: u8, quiet: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity, quiet)));

    let result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(verbosity > 1)
        .without_time()
        .try_init();
    if let Err(err) = result {
        log::debug!("logging already initialised: {err}");
    }
}
