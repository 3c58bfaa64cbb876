//! Diagnostic logging. Goes to stderr so report output on stdout stays clean; the
//! level comes from `RUST_LOG`, or from `--verbose` when that is unset.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "atmer=warn";
const VERBOSE_FILTER: &str = "atmer=debug";

fn default_filter(verbose: bool) -> &'static str {
    if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER }
}

pub fn init(verbose: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(verbose).into());

    // Keeps whichever subscriber was installed first
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter(false), "atmer=warn");
        assert_eq!(default_filter(true), "atmer=debug");
    }

    #[test]
    fn test_init_twice() {
        init(false);
        init(true);
    }
}
