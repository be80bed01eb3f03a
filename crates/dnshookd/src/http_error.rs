//! HTTP error returned by the boundary
use axum::{
    http::{HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use dnshook_core::Error;

/// Realm sent with Basic auth challenges
pub const AUTH_REALM: &str = "Basic realm=\"dnshook\"";

pub type HttpResult<T, E = HttpError> = core::result::Result<T, E>;

#[derive(Debug, Clone)]
pub struct HttpError {
    status: StatusCode,
    detail: Option<String>,
}

impl HttpError {
    pub fn new(status_code: StatusCode, message: Option<impl ToString>) -> HttpError {
        Self {
            status: status_code,
            detail: message.map(|m| m.to_string()),
        }
    }

    #[cfg(test)]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn not_found(message: impl ToString) -> HttpError {
        Self::new(StatusCode::NOT_FOUND, Some(message))
    }

    pub fn internal_server() -> HttpError {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, Some("Internal server error"))
    }

    pub fn bad_request(message: impl ToString) -> HttpError {
        Self::new(StatusCode::BAD_REQUEST, Some(message))
    }

    pub fn bad_gateway(message: impl ToString) -> HttpError {
        Self::new(StatusCode::BAD_GATEWAY, Some(message))
    }

    pub fn gateway_timeout(message: impl ToString) -> HttpError {
        Self::new(StatusCode::GATEWAY_TIMEOUT, Some(message))
    }

    pub fn unauthorized() -> HttpError {
        Self::new(StatusCode::UNAUTHORIZED, Some("Unauthorized"))
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> axum::response::Response {
        let mut response = match self.detail {
            Some(detail) => (self.status, detail).into_response(),
            _ => (self.status,).into_response(),
        };
        if self.status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static(AUTH_REALM),
            );
        }
        response
    }
}

impl From<Error> for HttpError {
    fn from(error: Error) -> Self {
        match error {
            Error::InvalidInput(message) => Self::bad_request(message),
            Error::ZoneNotFound { .. } | Error::ZoneNotRegistered { .. } => {
                tracing::warn!(%error, "zone discovery failed");
                Self::not_found(error)
            }
            Error::ZoneLookupTimeout { .. } => {
                tracing::warn!(%error, "zone discovery timed out");
                Self::gateway_timeout(error)
            }
            Error::ProviderWriteFailed {
                operation, status, ..
            } => {
                tracing::error!(%error, "provider write failed");
                Self::bad_gateway(format!("provider {} failed (status {})", operation, status))
            }
            Error::Provider { .. } => {
                tracing::error!(%error, "provider request failed");
                Self::bad_gateway("provider request failed")
            }
            error => {
                tracing::error!(?error);
                Self::internal_server()
            }
        }
    }
}
