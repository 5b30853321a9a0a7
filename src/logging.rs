use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize structured JSON logging.
///
/// Defaults to `error` level unless overridden by `MICASE_LOG`.
pub fn init() {
    init_with_default(tracing::level_filters::LevelFilter::ERROR);
}

/// Initialize structured JSON logging with a caller-chosen default level.
///
/// `MICASE_LOG` still wins when it is set.
pub fn init_with_default(default: tracing::level_filters::LevelFilter) {
    let filter = EnvFilter::builder()
        .with_env_var("MICASE_LOG")
        .with_default_directive(default.into())
        .from_env_lossy();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(true)
                .with_span_list(true),
        )
        .try_init();
}
