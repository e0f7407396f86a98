//! Shared-secret authentication for the CI webhook.
//!
//! The CI pipeline authenticates by sending the configured token either in
//! the `X-CI-TOKEN` header or as a `token` query parameter. The header takes
//! precedence when both are present. An empty configured secret disables
//! the webhook: every request is rejected.

use axum::http::HeaderMap;
use std::fmt;

/// Header carrying the CI token.
pub const TOKEN_HEADER: &str = "x-ci-token";

/// Authenticator for CI state updates.
#[derive(Clone, Default)]
pub struct CiAuth {
    secret: String,
}

impl CiAuth {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Returns whether a secret is configured at all.
    pub fn is_enabled(&self) -> bool {
        !self.secret.is_empty()
    }

    /// Validates `provided` against the configured secret.
    ///
    /// A missing token never validates.
    pub fn validate(&self, provided: Option<&[u8]>) -> bool {
        provided.is_some_and(|token| validate(token, &self.secret))
    }
}

impl fmt::Debug for CiAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CiAuth({self})")
    }
}

impl fmt::Display for CiAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_enabled() {
            write!(f, "Token(*****)")
        } else {
            write!(f, "Disabled")
        }
    }
}

/// Checks a caller-supplied token against the expected secret.
///
/// Returns `false` whenever `expected` is empty, including for an empty
/// `provided` token. `provided` is taken as raw bytes since header values
/// need not be valid UTF-8.
pub fn validate(provided: &[u8], expected: &str) -> bool {
    if expected.is_empty() {
        return false;
    }
    constant_time_eq(provided, expected.as_bytes())
}

/// Compares two byte strings without exiting early on the first mismatch.
///
/// The running time depends only on the length of `a` (the caller-supplied
/// value), never on where the inputs differ.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let mut diff = a.len() ^ b.len();
    for (i, byte_a) in a.iter().enumerate() {
        let byte_b = b.get(i).copied().unwrap_or(0);
        diff |= usize::from(byte_a ^ byte_b);
    }
    std::hint::black_box(diff) == 0
}

/// Picks the token from the header, falling back to the query parameter.
///
/// A present header always wins, whatever its value.
pub fn extract_token<'a>(
    headers: &'a HeaderMap,
    query_token: Option<&'a str>,
) -> Option<&'a [u8]> {
    match headers.get(TOKEN_HEADER) {
        Some(value) => Some(value.as_bytes()),
        None => query_token.map(str::as_bytes),
    }
}
