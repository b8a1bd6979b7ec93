//! Structured logging for the Safeguard session client
//!
//! This crate provides the observability pieces shared by every layer of the
//! client:
//! - Log sanitization so credentials never reach a log line
//! - A [`SessionObserver`] sink for token lifecycle and request metadata
//! - Error classification for structured failure fields
//! - `tracing-subscriber` initialization driven by `RUST_LOG`
//!
//! # Example
//!
//! ```rust,no_run
//! use safeguard_logging::{init_logging, tracing_observer, SessionEvent};
//!
//! init_logging().expect("Failed to initialize logging");
//!
//! let observer = tracing_observer();
//! observer.on_event(&SessionEvent::TokenCleared {
//!     authenticator: "Password".to_string(),
//! });
//! ```

pub mod observer;
pub mod sanitization;

pub use observer::{
    FederationStage, RecordingObserver, SessionEvent, SessionObserver, TracingObserver,
    tracing_observer,
};
pub use sanitization::{LogSanitizer, SanitizationConfig, get_sanitizer};

use tracing_subscriber::EnvFilter;

/// Result alias for subscriber setup
pub type Result<T> = std::result::Result<T, LoggingError>;

/// Failure to set up logging
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// The filter directive could not be parsed
    #[error("Invalid log configuration: {0}")]
    Config(String),

    /// A global subscriber was already installed
    #[error("Unable to install log subscriber: {0}")]
    Tracing(String),
}

/// Coarse classification of an error for structured log fields.
///
/// The session error type implements this so every failure is logged with
/// the same `error_type`, `retryable` and `auth` fields.
pub trait ErrorClassification: std::fmt::Display + std::error::Error {
    /// Short machine-readable category, e.g. `federation`
    fn error_type(&self) -> &str;
    /// Whether trying again later may succeed
    fn is_retryable(&self) -> bool;
    /// Whether the request ran out of time
    fn is_timeout(&self) -> bool;
    /// Whether the credential or token was rejected
    fn is_auth_error(&self) -> bool;
    /// Whether the server could not be reached at all
    fn is_connection_error(&self) -> bool;
}

/// Default filter used when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Install a global `tracing` subscriber filtered by `RUST_LOG`.
///
/// Fails if a global subscriber is already installed.
pub fn init_logging() -> Result<()> {
    init_logging_with_filter(None)
}

/// Install a global subscriber with an explicit filter directive.
///
/// `None` falls back to `RUST_LOG`, then to [`DEFAULT_LOG_FILTER`].
pub fn init_logging_with_filter(directive: Option<&str>) -> Result<()> {
    let filter = match directive {
        Some(directive) => EnvFilter::try_new(directive)
            .map_err(|e| LoggingError::Config(format!("Invalid filter '{directive}': {e}")))?,
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| LoggingError::Tracing(e.to_string()))
}

/// Like [`init_logging`], but ignores an already installed subscriber.
///
/// Handy in tests and embedding applications that may have set up logging
/// themselves.
pub fn try_init_logging() {
    let _ = init_logging();
}
