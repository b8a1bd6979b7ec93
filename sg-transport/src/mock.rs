//! Scripted sender for tests
//!
//! Available with the `test-util` feature.

use crate::{HttpRequest, HttpResponse, HttpSender, TransportError};
use async_trait::async_trait;
use safeguard_protocol::Method;
use std::collections::VecDeque;
use std::sync::Mutex;

/// What the scripted sender answers with
#[derive(Debug, Clone)]
pub enum Reply {
    /// Return this response
    Respond(HttpResponse),
    /// Fail as if the server could not be reached
    Refuse,
}

/// Copy of a request as it was sent
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP verb
    pub method: Method,
    /// Absolute URL without query
    pub url: String,
    /// Query parameters in order
    pub query: Vec<(String, String)>,
    /// Headers in order
    pub headers: Vec<(String, String)>,
    /// Body text
    pub body: Option<String>,
}

impl RecordedRequest {
    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Sender that records every request and replays queued replies.
///
/// Replies are keyed by verb and URL suffix. Queued replies are consumed in
/// order and the last one repeats. Unscripted requests are refused.
#[derive(Default)]
pub struct ScriptedSender {
    routes: Mutex<Vec<(Method, String, VecDeque<Reply>)>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedSender {
    /// Create a sender with no routes
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for `method` requests whose URL ends with `suffix`
    pub fn on(&self, method: Method, suffix: &str, reply: Reply) -> &Self {
        let mut routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());
        match routes
            .iter_mut()
            .find(|(m, s, _)| *m == method && s == suffix)
        {
            Some((_, _, queue)) => queue.push_back(reply),
            None => routes.push((method, suffix.to_string(), VecDeque::from([reply]))),
        }
        self
    }

    /// Queue a plain response
    pub fn respond(&self, method: Method, suffix: &str, status: u16, body: &str) -> &Self {
        self.on(method, suffix, Reply::Respond(HttpResponse::new(status, body)))
    }

    /// Every request seen so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of `method` requests whose URL ends with `suffix`
    pub fn count(&self, method: Method, suffix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.url.ends_with(suffix))
            .count()
    }

    /// Forget recorded requests, keeping the routes
    pub fn reset_requests(&self) {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

#[async_trait]
impl HttpSender for ScriptedSender {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedRequest {
                method: request.method,
                url: request.url.clone(),
                query: request.query.clone(),
                headers: request
                    .headers
                    .iter()
                    .map(|(n, v)| (n.to_string(), v.to_string()))
                    .collect(),
                body: request.body.clone(),
            });

        let reply = {
            let mut routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());
            routes
                .iter_mut()
                .find(|(m, s, _)| *m == request.method && request.url.ends_with(s.as_str()))
                .and_then(|(_, _, queue)| {
                    if queue.len() > 1 {
                        queue.pop_front()
                    } else {
                        queue.front().cloned()
                    }
                })
        };

        match reply {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::Refuse) | None => Err(TransportError::Connection(format!(
                "connection refused: {}",
                request.url
            ))),
        }
    }
}
