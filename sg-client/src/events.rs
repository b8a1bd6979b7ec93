//! Hand-off point to the event notification subsystem
//!
//! The listener itself lives outside this crate. A connection only tells a
//! factory where to connect and with which token, or gives it a whole
//! connection when the listener must be able to log in again on its own.

use crate::SessionConnection;
use safeguard_auth::SecretBuffer;
use safeguard_protocol::Result;

/// Everything a one-shot listener needs to connect
#[derive(Debug, Clone)]
pub struct EventListenerTarget {
    /// `https://<host>/service/event`
    pub event_url: String,
    /// Copy of the access token at creation time; `None` for anonymous
    /// sessions or after logout
    pub access_token: Option<SecretBuffer>,
    /// Whether TLS verification is skipped
    pub ignore_ssl: bool,
}

/// Builds event listeners for a session.
///
/// A plain listener stops working when its token expires. A persistent one
/// owns a cloned connection and refreshes the token through it.
pub trait EventListenerFactory {
    /// Listener type produced by this factory
    type Listener;

    /// Listener bound to the current token
    fn event_listener(&self, target: EventListenerTarget) -> Result<Self::Listener>;

    /// Listener that owns `connection` and can re-authenticate with it
    fn persistent_event_listener(&self, connection: SessionConnection) -> Result<Self::Listener>;
}
