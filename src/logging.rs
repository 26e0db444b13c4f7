//! Diagnostic logging setup.
//!
//! Diagnostics go to stderr through `tracing`. `RUST_LOG` wins when set;
//! otherwise the `-v` count picks the level.

use tracing_subscriber::EnvFilter;

pub fn level_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber. Calling it twice is harmless.
pub fn init(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("linebisect={}", level_for_verbosity(verbose))));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(level_for_verbosity(0), "warn");
        assert_eq!(level_for_verbosity(1), "info");
        assert_eq!(level_for_verbosity(2), "debug");
        assert_eq!(level_for_verbosity(9), "trace");
    }

    #[test]
    fn test_init_is_idempotent() {
        init(0);
        init(2);
    }
}
