use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable that overrides the default log filter.
pub const LOG_ENV_VAR: &str = "GANTRY_LOG";

/// Initialize structured JSON logging to stderr.
///
/// The default filter is `gantry=info` (`gantry=error` when `quiet`);
/// `GANTRY_LOG` takes precedence when set, using the usual
/// `tracing_subscriber` directive syntax.
pub fn init_logging(quiet: bool) {
    let fallback = if quiet { "gantry=error" } else { "gantry=info" };
    let filter =
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(false)
                .with_span_list(false),
        )
        .with(filter)
        .init();
}
