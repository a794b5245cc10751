//! Tracing subscriber setup.
//!
//! `RUST_LOG` wins over `server.log_level`. Production emits JSON lines,
//! other environments the human-readable format.

use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

/// Error returned when a global subscriber is already installed.
pub type InitError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Filter from `RUST_LOG`, falling back to the configured directive.
pub fn env_filter(server: &ServerConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&server.log_level))
}

/// Install the global tracing subscriber.
pub fn init_tracing(server: &ServerConfig) -> Result<(), InitError> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(server))
        .with_target(true);

    if server.is_production() {
        builder.json().with_current_span(true).try_init()
    } else {
        builder.try_init()
    }
}
