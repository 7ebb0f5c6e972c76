//! Diagnostic logging setup.
//!
//! Logs go to stderr; stdout is reserved for command output (`gen-config`
//! pipes its JSON, `build` and `check` print their inventories).

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter: this crate at `info`, or `debug` with `-v`.
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "shortlist=debug,warn"
    } else {
        "shortlist=info,warn"
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init_cli_logger(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}
