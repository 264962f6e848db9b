use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialise stderr logging, INFO by default and overridable with `RUST_LOG`.
///
/// Stdout is left to the run summary so it can be piped.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::filter::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init()
}
