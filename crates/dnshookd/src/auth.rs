//! HTTP Basic authentication against the static hostname → token map
//!
//! The username is the hostname the caller wants to modify and the password
//! is that hostname's token. A credential only ever authorizes its own
//! hostname.

use axum::{
    extract::{Path, Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::collections::HashMap;

use crate::app_state::AppState;
use crate::http_error::{HttpError, HttpResult};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing Authorization header")]
    Missing,

    #[error("malformed Basic credentials")]
    Malformed,

    #[error("credentials are for a different hostname")]
    HostnameMismatch,

    #[error("unknown hostname or wrong token")]
    Rejected,
}

impl From<AuthError> for HttpError {
    fn from(_: AuthError) -> Self {
        HttpError::unauthorized()
    }
}

/// Username/password pair from a Basic `Authorization` header
struct BasicCredentials {
    username: String,
    password: String,
}

impl BasicCredentials {
    fn from_headers(headers: &HeaderMap) -> Result<Self, AuthError> {
        let value = headers
            .get(header::AUTHORIZATION)
            .ok_or(AuthError::Missing)?
            .to_str()
            .map_err(|_| AuthError::Malformed)?;

        let (scheme, encoded) = value.split_once(' ').ok_or(AuthError::Malformed)?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return Err(AuthError::Malformed);
        }

        let decoded = STANDARD
            .decode(encoded.trim())
            .map_err(|_| AuthError::Malformed)?;
        let decoded = String::from_utf8(decoded).map_err(|_| AuthError::Malformed)?;
        let (username, password) = decoded.split_once(':').ok_or(AuthError::Malformed)?;

        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

/// Static hostname → token table
pub struct Authenticator {
    tokens: HashMap<String, String>,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut hostnames: Vec<&String> = self.tokens.keys().collect();
        hostnames.sort();
        f.debug_struct("Authenticator")
            .field("hostnames", &hostnames)
            .finish()
    }
}

impl Authenticator {
    pub fn new(tokens: HashMap<String, String>) -> Self {
        Self { tokens }
    }

    /// Check that `headers` carry valid credentials for `hostname`
    pub fn authorize(&self, headers: &HeaderMap, hostname: &str) -> Result<(), AuthError> {
        let credentials = BasicCredentials::from_headers(headers)?;

        if credentials.username != hostname {
            return Err(AuthError::HostnameMismatch);
        }

        match self.tokens.get(hostname) {
            Some(expected) if constant_time_eq(expected.as_bytes(), credentials.password.as_bytes()) => {
                Ok(())
            }
            _ => Err(AuthError::Rejected),
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Route layer guarding `/txt/{hostname}`
pub async fn require_txt_auth(
    State(state): State<AppState>,
    Path(hostname): Path<String>,
    request: Request,
    next: Next,
) -> HttpResult<Response> {
    if let Err(reason) = state.auth.authorize(request.headers(), &hostname) {
        tracing::warn!(%hostname, %reason, "rejected request");
        return Err(reason.into());
    }
    Ok(next.run(request).await)
}
