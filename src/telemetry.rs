use tracing_subscriber::EnvFilter;

/// Installs a formatting subscriber for the embedding application.
///
/// `RUST_LOG` takes precedence; otherwise `info` globally and `debug` for
/// this crate. Calling it twice is harmless, the second call does nothing.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,jewelbook=debug"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}
