//! Diagnostic tracing for the emulator.
//!
//! The library only emits `tracing` events; binaries decide where they go by calling [`init`].
//! `RUST_LOG` always wins over the defaults chosen here.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when verbose mode is on: every transition is traced.
pub const VERBOSE_FILTER: &str = "unituring=debug";
/// Filter used otherwise.
pub const DEFAULT_FILTER: &str = "warn";

/// Picks the filter directive for the given verbosity.
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_FILTER
    } else {
        DEFAULT_FILTER
    }
}

/// Initialize the tracing subscriber.
///
/// Output: stderr, compact format, so that tape views on stdout stay clean.
///
/// # Example
/// ```bash
/// RUST_LOG=unituring=trace unituring-cli -a -s 0 -t tapes/unary-successor.utm
/// ```
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter(true), "unituring=debug");
        assert_eq!(default_filter(false), "warn");
    }
}
