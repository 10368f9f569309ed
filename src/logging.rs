//! Logging initialization.

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `level`. Safe to call more than once;
/// later calls are ignored.
pub fn init_logging(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_target(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
}
