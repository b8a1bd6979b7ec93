//! Credential scrubbing for log output
//!
//! Free text that can reach a log line (federation failures, transport error
//! messages) may echo credentials back. Every rule below keeps the key and
//! separator and replaces only the value.

use regex::{Captures, Regex};
use std::sync::OnceLock;

/// `key=value`, `key: value` and JSON `"key":"value"` forms of password-like keys
const SECRET_PATTERN: &str = r#"(?i)(?P<prefix>["']?\b(?:password|passwd|pwd|pass|passphrase|client_secret|secret|credentials?)["']?\s*[=:]\s*["'`]?)(?P<value>[^"'`\s,}&]+)"#;

/// Any key ending in `token`: `access_token`, `UserToken`, `StsAccessToken`
const TOKEN_PATTERN: &str =
    r#"(?i)(?P<prefix>["']?\b\w*token["']?\s*[=:]\s*["']?)(?P<value>[A-Za-z0-9._~+/=-]+)"#;

/// `Authorization: Bearer <value>`
const BEARER_PATTERN: &str = r"(?i)(?P<prefix>\bbearer\s+)(?P<value>[A-Za-z0-9._~+/=-]+)";

static RULES: OnceLock<Vec<Regex>> = OnceLock::new();

fn rules() -> &'static [Regex] {
    RULES.get_or_init(|| {
        [SECRET_PATTERN, TOKEN_PATTERN, BEARER_PATTERN]
            .into_iter()
            .map(|pattern| Regex::new(pattern).expect("Invalid sanitization pattern"))
            .collect()
    })
}

/// Sanitization configuration
#[derive(Debug, Clone)]
pub struct SanitizationConfig {
    /// Scrub messages. On by default in every build profile.
    pub enabled: bool,

    /// Text written in place of a secret value
    pub replacement: String,
}

impl Default for SanitizationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            replacement: "[REDACTED]".to_string(),
        }
    }
}

/// Scrubs credentials out of free text and JSON documents
#[derive(Debug)]
pub struct LogSanitizer {
    config: SanitizationConfig,
}

impl LogSanitizer {
    /// Sanitizer with the default `[REDACTED]` replacement
    pub fn new() -> Self {
        Self::with_config(SanitizationConfig::default())
    }

    /// Sanitizer with a custom configuration
    pub fn with_config(config: SanitizationConfig) -> Self {
        Self { config }
    }

    /// Replace every credential value in `message`
    pub fn sanitize(&self, message: &str) -> String {
        if !self.config.enabled {
            return message.to_string();
        }

        rules().iter().fold(message.to_string(), |text, rule| {
            rule.replace_all(&text, |caps: &Captures| {
                format!("{}{}", &caps["prefix"], self.config.replacement)
            })
            .into_owned()
        })
    }

    /// Sanitized `Display` output of an error
    pub fn sanitize_error(&self, error: &dyn std::error::Error) -> String {
        self.sanitize(&error.to_string())
    }
}

impl Default for LogSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_SANITIZER: OnceLock<LogSanitizer> = OnceLock::new();

/// Process-wide sanitizer used by the observers and the session layer
pub fn get_sanitizer() -> &'static LogSanitizer {
    GLOBAL_SANITIZER.get_or_init(LogSanitizer::new)
}

#[cfg(test)]
#[path = "sanitization_tests.rs"]
mod sanitization_tests;
