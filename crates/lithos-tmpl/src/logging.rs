// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Diagnostic logging to stderr.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive that overrides `-v`/`-q`.
pub const LOG_ENV: &str = "LITHOS_TMPL_LOG";

/// Installs a stderr `fmt` subscriber.
///
/// `LITHOS_TMPL_LOG` wins when it parses; otherwise `default_level` applies.
/// A subscriber installed earlier (e.g. by a test harness) is left in place.
pub fn init(default_level: LevelFilter) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::default().add_directive(default_level.into()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
