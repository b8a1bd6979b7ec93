//! Request and response model types shared by the transport and client crates

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Backend service targeted by a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Service {
    /// Core resource API
    Core,
    /// Appliance management API
    Appliance,
    /// Notification API, usable without authentication
    Notification,
    /// Application-to-application API, which has its own calling convention
    A2A,
}

impl Service {
    /// Path segment under `/service/`
    pub fn segment(&self) -> &'static str {
        match self {
            Service::Core => "core",
            Service::Appliance => "appliance",
            Service::Notification => "notification",
            Service::A2A => "a2a",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Service::Core => "Core",
            Service::Appliance => "Appliance",
            Service::Notification => "Notification",
            Service::A2A => "A2A",
        };
        f.write_str(name)
    }
}

/// HTTP verb supported by the dispatch layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

impl Method {
    /// Upper-case verb name
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// Whether a request body is sent with this verb
    pub fn carries_body(&self) -> bool {
        matches!(self, Method::Post | Method::Put)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered header list with case-insensitive lookup.
///
/// Values routinely hold bearer tokens, so `Debug` prints names only and
/// every value is zero-filled on [`Headers::wipe`] and on drop.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Create an empty header list
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Headers::insert`]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a header, replacing an existing one with the same name in place
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some(entry) => {
                entry.1.zeroize();
                entry.1 = value;
            }
            None => self.entries.push((name, value)),
        }
    }

    /// Value of the named header
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Whether the named header is present
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Remove the named header, wiping its value
    pub fn remove(&mut self, name: &str) {
        self.entries.retain_mut(|(existing, value)| {
            if existing.eq_ignore_ascii_case(name) {
                value.zeroize();
                false
            } else {
                true
            }
        });
    }

    /// Overlay another header list; its values win on name clashes
    pub fn extend(&mut self, other: &Headers) {
        for (name, value) in other.iter() {
            self.insert(name, value);
        }
    }

    /// Iterate over `(name, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Header names in insertion order
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(name, _)| name.clone()).collect()
    }

    /// Number of headers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no headers
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Zero-fill every value and drop all entries
    pub fn wipe(&mut self) {
        for (_, value) in self.entries.iter_mut() {
            value.zeroize();
        }
        self.entries.clear();
    }
}

impl fmt::Debug for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(name, _)| name))
            .finish()
    }
}

impl Zeroize for Headers {
    fn zeroize(&mut self) {
        self.wipe();
    }
}

impl Drop for Headers {
    fn drop(&mut self) {
        self.wipe();
    }
}

impl ZeroizeOnDrop for Headers {}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

/// Complete response of a successful API call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: Headers,
    /// Response body text
    pub body: String,
}

impl FullResponse {
    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod model_tests;
