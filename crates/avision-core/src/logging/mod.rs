use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Crate-level directive for the given verbosity.
pub fn log_directive(quiet: bool) -> &'static str {
    if quiet { "avision=error" } else { "avision=info" }
}

/// `RUST_LOG` directives, with the avision directive layered on top.
pub fn log_filter(quiet: bool) -> EnvFilter {
    EnvFilter::from_default_env()
        .add_directive(log_directive(quiet).parse().expect("Invalid log directive"))
}

/// Install the JSON subscriber on stderr; stdout belongs to the HUD.
///
/// Quiet mode keeps only error events.
pub fn init_logging(quiet: bool) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(false)
                .with_span_list(false),
        )
        .with(log_filter(quiet))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive_by_verbosity() {
        assert_eq!(log_directive(true), "avision=error");
        assert_eq!(log_directive(false), "avision=info");
    }

    #[test]
    fn test_filter_carries_crate_directive() {
        assert!(log_filter(true).to_string().contains("avision=error"));
        assert!(log_filter(false).to_string().contains("avision=info"));
    }
}
