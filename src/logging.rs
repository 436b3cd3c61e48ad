//! Logging setup: `tracing` events to stderr.
//!
//! `RUST_LOG` wins when set. Otherwise `-v` picks info, `-vv` debug, and
//! without either the config's `log-level` (or `warn`) applies.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Call once, before any work.
pub fn init(verbose: u8, configured: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, configured)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn default_directive(verbose: u8, configured: Option<&str>) -> &str {
    match verbose {
        0 => configured.unwrap_or("warn"),
        1 => "info",
        _ => "debug",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_overrides_config() {
        assert_eq!(default_directive(1, Some("error")), "info");
        assert_eq!(default_directive(2, None), "debug");
        assert_eq!(default_directive(5, None), "debug");
    }

    #[test]
    fn config_level_applies_without_flags() {
        assert_eq!(default_directive(0, Some("nwpc_log_tool=debug")), "nwpc_log_tool=debug");
        assert_eq!(default_directive(0, None), "warn");
    }
}
