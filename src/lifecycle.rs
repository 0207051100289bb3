//! Process-wide setup shared by binaries and integration harnesses.

/// Initialize logging with tracing_subscriber.
///
/// `RUST_LOG` directives are honored and layered over the defaults. Calling
/// this twice is harmless: the second subscriber is simply not installed.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
        .add_directive("seo_auditor=debug".parse().unwrap());

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .with_target(false)
        .with_ansi(true)
        .try_init();
}
