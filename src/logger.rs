//! Logging setup for the `godeps` binary.
//!
//! Logs go to stderr so that stdout carries nothing but the rendered graph.
//! `--verbose` enables debug output, `--quiet` limits output to errors, and
//! otherwise `RUST_LOG` is honoured with an info-level default.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "godeps=info";

pub fn init_logger(verbose: bool, quiet: bool) {
    let filter = log_filter(verbose, quiet);

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .compact();

    // A subscriber may already be installed (e.g. by a test harness).
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn log_filter(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("godeps=debug")
    } else if quiet {
        EnvFilter::new("godeps=error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_wins_over_quiet() {
        assert!(log_filter(true, true).to_string().contains("debug"));
        assert!(log_filter(false, true).to_string().contains("error"));
    }
}
