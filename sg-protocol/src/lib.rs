//! Core types for the Safeguard session client
//!
//! This crate holds the vocabulary shared by the transport, authentication
//! and client crates:
//! - [`Error`] and the [`Result`] alias used by every session operation
//! - [`Service`] and [`Method`] selecting where and how a call is dispatched
//! - [`Headers`], an ordered case-insensitive header list that can be wiped
//! - [`FullResponse`] returned by full invocations
//! - [`ConnectionConfig`] describing the appliance to talk to
//!
//! # Example
//!
//! ```rust
//! use safeguard_protocol::{ConnectionConfig, Service};
//!
//! let config = ConnectionConfig::new("sg.example.com");
//! assert_eq!(
//!     config.service_url(Service::Core),
//!     "https://sg.example.com/service/core/v4"
//! );
//! ```

pub mod config;
pub mod error;
pub mod model;

pub use config::{ConnectionConfig, DEFAULT_API_VERSION, DEFAULT_TIMEOUT_SECS};
pub use error::{Error, Result};
pub use model::{FullResponse, Headers, Method, Service};

/// Prefix of a resolved identity provider scope
pub const PRIMARY_PROVIDER_SCOPE_PREFIX: &str = "rsts:sts:primaryproviderid:";

/// Scope used for the local identity provider
pub const LOCAL_PROVIDER_SCOPE: &str = "rsts:sts:primaryproviderid:local";

/// Remaining token lifetime reported when the server accepts the token but
/// does not say how long it stays valid
pub const UNKNOWN_LIFETIME_REMAINING: u32 = 10;

/// Header carrying the remaining token lifetime in minutes
pub const TOKEN_LIFETIME_HEADER: &str = "X-TokenLifetimeRemaining";
