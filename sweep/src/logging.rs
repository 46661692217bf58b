use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize stderr logging.
///
/// `RUST_LOG` takes precedence; otherwise the sweep crates log at `level`
/// and the result format at `warn`.
pub fn init_logging(level: &str) -> Result<(), TryInitError> {
    let default_filter =
        format!("lra_bench={level},lra_sweep={level},sweep_plot={level},result_format=warn");
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false),
        )
        .try_init()
}
