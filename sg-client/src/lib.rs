//! Session client for the Safeguard REST API
//!
//! A [`SessionConnection`] wraps one authenticated session: it keeps the
//! access token through its [`Authenticator`](safeguard_auth::Authenticator),
//! routes calls to the core, appliance and notification services, and hands
//! event listener factories what they need.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use safeguard_auth::SecretBuffer;
//! use safeguard_client::connect_password;
//! use safeguard_protocol::{ConnectionConfig, Headers, Method, Service};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! safeguard_logging::init_logging()?;
//!
//! let config = ConnectionConfig::from_env()?;
//! let mut connection =
//!     connect_password(config, "local", "admin", SecretBuffer::from("secret")).await?;
//!
//! let me = connection
//!     .invoke(Service::Core, Method::Get, "Me", None, &[], &Headers::new())
//!     .await?;
//! println!("{me}");
//!
//! connection.log_out().await?;
//! # Ok(())
//! # }
//! ```

pub mod connect;
pub mod connection;
pub mod events;

pub use connect::{
    Connector, connect_anonymous, connect_certificate, connect_password, connect_sts_token,
};
pub use connection::SessionConnection;
pub use events::{EventListenerFactory, EventListenerTarget};

// Re-export the vocabulary callers need alongside the connection
pub use safeguard_auth::SecretBuffer;
pub use safeguard_protocol::{
    ConnectionConfig, Error, FullResponse, Headers, Method, Result, Service,
};
pub use safeguard_transport::ClientIdentity;
