//! Tracing initialisation for sinkcheck binaries.
//!
//! Call [`init_tracing`] once at program start. Diagnostics always go to
//! stderr: stdout carries the verdict prompt and the sweep summary, and log
//! lines must not interleave with either. The default filter covers only the
//! sinkcheck crates; set `RUST_LOG` to widen or reshape it.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Log targets of the harness crates, the default filter scope.
const HARNESS_TARGETS: [&str; 4] = [
    "sinkcheck",
    "sinkcheck_caps",
    "sinkcheck_core",
    "sinkcheck_gst",
];

/// Directive string enabling every harness crate at `level`.
///
/// Target prefixes do not cross crate boundaries, so each crate is listed;
/// targets outside the list stay disabled.
fn default_directives(level: Level) -> String {
    let level = level.as_str().to_ascii_lowercase();
    HARNESS_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialise the global tracing subscriber.
///
/// * `json`: emit newline-delimited JSON log lines.
/// * `level`: verbosity applied to the sinkcheck crates when `RUST_LOG` is
///   not set. A set `RUST_LOG` replaces the default filter entirely.
///
/// Safe to call multiple times; only the first call takes effect.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .json(),
            )
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
            .ok();
    }
}
