//! Tracing subscriber setup.
//!
//! - `LOG_LEVEL` sets the filter (`debug`, or directives such as
//!   `info,leetcode_daily::source=debug`). Defaults to [`DEFAULT_FILTER`].
//! - `LOG_FORMAT=json` switches to structured JSON lines; anything else is the
//!   human-readable format.
//!
//! Logs go to stderr so they never mix with command output on stdout.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "info,leetcode_daily=info";

pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => builder.json().init(),
        _ => builder.init(),
    }
}
