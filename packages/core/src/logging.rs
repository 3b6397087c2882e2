use tracing_subscriber::{fmt, EnvFilter};

/// Quiet the SMTP and HTTP stacks unless `RUST_LOG` asks for them.
const DEFAULT_FILTER: &str = "info,lettre=warn,hyper=warn,reqwest=warn";

/// Initialize structured logging for the service.
///
/// This must be called once at startup (in main.rs).
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    tracing::info!("Logging initialized");
}
