//! Error types for Safeguard session operations

/// Result type alias for Safeguard session operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failure of a session, federation or argument check
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Operation attempted on a disposed object
    #[error("{object} has been disposed")]
    Disposed {
        /// Name of the disposed object
        object: String,
    },

    /// Invalid caller input, raised before any I/O
    #[error("{0}")]
    Argument(String),

    /// Failure talking to the security token service
    #[error("{message}")]
    Federation {
        /// Human-readable message
        message: String,
        /// HTTP status when the STS answered with a failure
        status: Option<u16>,
        /// Response body when the STS answered with a failure
        body: Option<String>,
    },

    /// Failure talking to the resource API
    #[error("{message}")]
    Session {
        /// Human-readable message
        message: String,
        /// HTTP status when the API answered with a failure
        status: Option<u16>,
        /// Response body when the API answered with a failure
        body: Option<String>,
    },
}

impl Error {
    /// Create a disposed error for the named object
    pub fn disposed(object: impl Into<String>) -> Self {
        Self::Disposed {
            object: object.into(),
        }
    }

    /// Create an argument error
    pub fn argument(message: impl Into<String>) -> Self {
        Self::Argument(message.into())
    }

    /// Create a federation error without response details
    pub fn federation(message: impl Into<String>) -> Self {
        Self::Federation {
            message: message.into(),
            status: None,
            body: None,
        }
    }

    /// Create a federation error for a non-success STS response.
    ///
    /// The message is `<prefix>, Error: <status> <body>`.
    pub fn federation_response(prefix: &str, status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        Self::Federation {
            message: format!("{prefix}, Error: {status} {body}"),
            status: Some(status),
            body: Some(body),
        }
    }

    /// Create a session error without response details
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session {
            message: message.into(),
            status: None,
            body: None,
        }
    }

    /// Create a session error for a non-success API response.
    ///
    /// The message is `<prefix>, Error: <status> <body>`.
    pub fn session_response(prefix: &str, status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        Self::Session {
            message: format!("{prefix}, Error: {status} {body}"),
            status: Some(status),
            body: Some(body),
        }
    }

    /// HTTP status attached to the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Federation { status, .. } | Self::Session { status, .. } => *status,
            _ => None,
        }
    }

    /// Response body attached to the error, if any
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Federation { body, .. } | Self::Session { body, .. } => body.as_deref(),
            _ => None,
        }
    }

    /// True if the error came from a failed connection rather than a server answer
    pub fn is_unreachable(&self) -> bool {
        match self {
            Self::Federation {
                message, status, ..
            }
            | Self::Session {
                message, status, ..
            } => status.is_none() && message.starts_with("Unable to connect"),
            _ => false,
        }
    }
}

#[cfg(feature = "logging")]
impl safeguard_logging::ErrorClassification for Error {
    fn error_type(&self) -> &str {
        match self {
            Error::Disposed { .. } => "disposed",
            Error::Argument(_) => "argument",
            Error::Federation { .. } => "federation",
            Error::Session { .. } => "session",
        }
    }

    fn is_retryable(&self) -> bool {
        self.is_unreachable() || self.status().is_some_and(|status| status >= 500)
    }

    fn is_timeout(&self) -> bool {
        // Transport timeouts surface as connection failures
        false
    }

    fn is_auth_error(&self) -> bool {
        matches!(self, Error::Federation { .. })
            || matches!(self.status(), Some(401) | Some(403))
    }

    fn is_connection_error(&self) -> bool {
        self.is_unreachable()
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
