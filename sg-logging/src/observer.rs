//! Session observability sink
//!
//! Every layer of the client reports what it does through one injected
//! [`SessionObserver`]. Events carry metadata only: header names but not
//! values, query keys but not values, body sizes but not bodies. Free-text
//! messages are passed through the global [`LogSanitizer`](crate::LogSanitizer)
//! before they are emitted.

use crate::sanitization::get_sanitizer;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Which step of the federation protocol failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FederationStage {
    /// Identity provider scope lookup on the STS
    ScopeResolution,
    /// OAuth grant against `oauth2/token`
    TokenGrant,
    /// Exchange of the STS token for a resource API token
    TokenExchange,
}

impl fmt::Display for FederationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FederationStage::ScopeResolution => "scope_resolution",
            FederationStage::TokenGrant => "token_grant",
            FederationStage::TokenExchange => "token_exchange",
        };
        f.write_str(name)
    }
}

/// A structured session event
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// An access token was stored after a successful refresh
    TokenObtained {
        /// Authenticator id, e.g. `Password`
        authenticator: String,
    },
    /// The access token was wiped
    TokenCleared {
        /// Authenticator id
        authenticator: String,
    },
    /// An identity provider scope was resolved and cached
    ScopeResolved {
        /// The cached scope string
        scope: String,
    },
    /// A request is about to be sent
    RequestStarted {
        /// HTTP verb
        method: String,
        /// Absolute URL without query string
        url: String,
        /// Query parameter names
        query_keys: Vec<String>,
        /// Header names
        header_names: Vec<String>,
    },
    /// A response came back from the server
    ResponseReceived {
        /// HTTP verb
        method: String,
        /// Absolute URL without query string
        url: String,
        /// HTTP status code
        status: u16,
        /// Number of response headers
        header_count: usize,
        /// Body length in bytes
        body_size: usize,
    },
    /// A federation step failed
    FederationFailed {
        /// Failing step
        stage: FederationStage,
        /// Error message
        message: String,
    },
    /// A best-effort logout request failed and was ignored
    LogoutFailed {
        /// Error message
        message: String,
    },
    /// An object was disposed
    Disposed {
        /// Object name, e.g. `SessionConnection`
        object: String,
    },
}

/// Sink for [`SessionEvent`]s
pub trait SessionObserver: Send + Sync + fmt::Debug {
    /// Record one event
    fn on_event(&self, event: &SessionEvent);
}

/// Observer that forwards events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl SessionObserver for TracingObserver {
    fn on_event(&self, event: &SessionEvent) {
        match event {
            SessionEvent::TokenObtained { authenticator } => {
                info!(authenticator = %authenticator, "Access token obtained");
            }
            SessionEvent::TokenCleared { authenticator } => {
                info!(authenticator = %authenticator, "Access token cleared");
            }
            SessionEvent::ScopeResolved { scope } => {
                debug!(scope = %scope, "Identity provider scope resolved");
            }
            SessionEvent::RequestStarted {
                method,
                url,
                query_keys,
                header_names,
            } => {
                debug!(
                    method = %method,
                    url = %url,
                    query_keys = ?query_keys,
                    header_names = ?header_names,
                    "Invoking method"
                );
            }
            SessionEvent::ResponseReceived {
                method,
                url,
                status,
                header_count,
                body_size,
            } => {
                debug!(
                    method = %method,
                    url = %url,
                    status = status,
                    header_count = header_count,
                    body_size = body_size,
                    "Response received"
                );
            }
            SessionEvent::FederationFailed { stage, message } => {
                warn!(
                    stage = %stage,
                    error = %get_sanitizer().sanitize(message),
                    "Federation failed"
                );
            }
            SessionEvent::LogoutFailed { message } => {
                warn!(
                    error = %get_sanitizer().sanitize(message),
                    "Logout request failed, clearing token anyway"
                );
            }
            SessionEvent::Disposed { object } => {
                debug!(object = %object, "Disposed");
            }
        }
    }
}

/// Observer that keeps every event in memory.
///
/// Useful for embedding applications that surface session activity
/// themselves, and for tests.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<SessionEvent>>,
}

impl RecordingObserver {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events in order
    pub fn events(&self) -> Vec<SessionEvent> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Forget every recorded event
    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

impl SessionObserver for RecordingObserver {
    fn on_event(&self, event: &SessionEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event.clone());
    }
}

/// Shared handle to the default [`TracingObserver`]
pub fn tracing_observer() -> Arc<dyn SessionObserver> {
    Arc::new(TracingObserver)
}
