//! Diagnostic logging setup.
//!
//! Logs go to stderr so that plain and JSON output on stdout stay clean.

use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive, e.g. `trawl=debug`.
pub const LOG_ENV: &str = "TRAWL_LOG";

/// Map repeated `-v` flags to a default directive.
pub fn level_for(verbosity: u8) -> &'static str {
	match verbosity {
		0 => "warn",
		1 => "info",
		2 => "debug",
		_ => "trace",
	}
}

fn filter_for(verbosity: u8) -> EnvFilter {
	EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level_for(verbosity)))
}

/// Install the global subscriber. Later calls are ignored.
pub fn initialize(verbosity: u8) {
	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter_for(verbosity))
		.with_target(false)
		.with_writer(std::io::stderr)
		.try_init();
}
