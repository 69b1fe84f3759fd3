/*!
 * Structured logging setup
 *
 * Logs go to stderr so they never mix with the report printed on stdout.
 * `RUST_LOG` takes precedence over the verbosity flag.
 */

use tracing_subscriber::EnvFilter;

/// Log level selected by the number of `-v` flags
pub fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber
///
/// Calling this more than once keeps the first subscriber.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("wixgen={}", level_for(verbosity))));

    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
    {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }
}
