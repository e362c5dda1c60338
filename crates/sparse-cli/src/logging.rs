//! Logging initialization for the CLI.
//!
//! Logging is owned by the CLI crate so the parser library only emits events.
//! Everything goes to stderr; stdout carries command output alone.

use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber.
///
/// # Arguments
/// * `verbosity` - 0 = WARN, 1 = DEBUG, 2+ = TRACE
/// * `json` - If true, output JSON lines to stderr
///
/// `RUST_LOG` is honoured; the verbosity flag adds directives for the
/// `sparse_parser` and `sparse_cli` targets on top of it.
pub fn init(verbosity: u8, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let filter = match verbosity {
        0 => filter,
        n => {
            let level = if n == 1 { Level::DEBUG } else { Level::TRACE };
            ["sparse_parser", "sparse_cli"]
                .into_iter()
                .filter_map(|target| format!("{target}={level}").parse::<Directive>().ok())
                .fold(filter, EnvFilter::add_directive)
        }
    };

    let subscriber = tracing_subscriber::registry().with(filter);

    // try_init: a second call (as in tests) keeps the first subscriber.
    if json {
        let _ = subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_writer(std::io::stderr),
            )
            .try_init();
    } else {
        let _ = subscriber
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init();
    }
}
