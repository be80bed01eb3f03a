//! `/nic/update`: dyndns2-style address update
//!
//! Answers are plain-text return codes rather than JSON so that stock
//! router firmware can talk to the daemon.
//!
//! | reply        | status |
//! |--------------|--------|
//! | `good <ips>` | 200    |
//! | `nochg <ips>`| 200    |
//! | `notfqdn`    | 400    |
//! | `badrequest` | 400    |
//! | `badauth`    | 401    |
//! | `nohost`     | 404    |
//! | `dnserr`     | 502    |
//! | `911`        | 500 / 504 |

use axum::{
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use dnshook_core::{DesiredRecord, Error, Hostname, ReconcileOutcome, RecordType};
use serde::Deserialize;
use std::net::IpAddr;

use crate::app_state::AppState;
use crate::http_error::AUTH_REALM;

#[derive(Debug, Deserialize)]
pub struct UpdateParams {
    hostname: Option<String>,
    myip: Option<String>,
    myipv6: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
enum Reply {
    Good(String),
    NoChange(String),
    NotFqdn,
    BadRequest,
    BadAuth,
    NoHost,
    DnsError,
    ServerError(StatusCode),
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Reply::Good(ips) => (StatusCode::OK, format!("good {}", ips)),
            Reply::NoChange(ips) => (StatusCode::OK, format!("nochg {}", ips)),
            Reply::NotFqdn => (StatusCode::BAD_REQUEST, "notfqdn".to_string()),
            Reply::BadRequest => (StatusCode::BAD_REQUEST, "badrequest".to_string()),
            Reply::BadAuth => (StatusCode::UNAUTHORIZED, "badauth".to_string()),
            Reply::NoHost => (StatusCode::NOT_FOUND, "nohost".to_string()),
            Reply::DnsError => (StatusCode::BAD_GATEWAY, "dnserr".to_string()),
            Reply::ServerError(status) => (status, "911".to_string()),
        };

        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(AUTH_REALM));
        }
        response
    }
}

impl From<Error> for Reply {
    fn from(error: Error) -> Self {
        match error {
            Error::InvalidInput(_) => Reply::BadRequest,
            Error::ZoneNotFound { .. } | Error::ZoneNotRegistered { .. } => {
                tracing::warn!(%error, "zone discovery failed");
                Reply::NoHost
            }
            Error::ZoneLookupTimeout { .. } => {
                tracing::warn!(%error, "zone discovery timed out");
                Reply::ServerError(StatusCode::GATEWAY_TIMEOUT)
            }
            Error::ProviderWriteFailed { .. } | Error::Provider { .. } => {
                tracing::error!(%error, "provider request failed");
                Reply::DnsError
            }
            error => {
                tracing::error!(?error);
                Reply::ServerError(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

/// Desired A/AAAA records from the `myip` and `myipv6` fields
///
/// The record type follows the parsed address family, whichever field it
/// arrived in. At most one address per family.
fn desired_addresses(params: &UpdateParams) -> Result<Vec<DesiredRecord>, Reply> {
    let mut desired: Vec<DesiredRecord> = Vec::new();

    for raw in [&params.myip, &params.myipv6].into_iter().flatten() {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        let ip: IpAddr = raw.parse().map_err(|_| Reply::BadRequest)?;
        let record = DesiredRecord::for_ip(ip);
        if desired.iter().any(|d| d.record_type == record.record_type) {
            return Err(Reply::BadRequest);
        }
        desired.push(record);
    }

    if desired.is_empty() {
        return Err(Reply::BadRequest);
    }
    Ok(desired)
}

async fn update_inner(state: &AppState, headers: &HeaderMap, params: &UpdateParams) -> Reply {
    let hostname = match params.hostname.as_deref().map(Hostname::parse) {
        Some(Ok(hostname)) => hostname,
        _ => return Reply::NotFqdn,
    };

    if let Err(reason) = state.auth.authorize(headers, hostname.as_str()) {
        tracing::warn!(%hostname, %reason, "rejected request");
        return Reply::BadAuth;
    }

    let desired = match desired_addresses(params) {
        Ok(desired) => desired,
        Err(reply) => return reply,
    };

    let outcomes = match state.engine.reconcile_converge(&hostname, &desired).await {
        Ok(outcomes) => outcomes,
        Err(error) => return error.into(),
    };

    let ips = desired
        .iter()
        .map(|d| d.value.as_str())
        .collect::<Vec<_>>()
        .join(",");

    if outcomes.iter().any(ReconcileOutcome::applied) {
        let families: Vec<RecordType> = desired.iter().map(|d| d.record_type).collect();
        tracing::info!(%hostname, ?families, "addresses updated");
        Reply::Good(ips)
    } else {
        Reply::NoChange(ips)
    }
}

pub async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<UpdateParams>,
) -> Response {
    update_inner(&state, &headers, &params).await.into_response()
}
