//! `/txt/{hostname}`: list, replace, converge and clear TXT records
//!
//! Authentication runs as a route layer before any of these handlers.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    response::IntoResponse,
};
use dnshook_core::{DesiredRecord, Hostname, ReconcileOutcome, RecordType};
use serde::Deserialize;
use serde_json::json;

use crate::app_state::AppState;
use crate::http_error::{HttpError, HttpResult};

#[derive(Debug, Deserialize)]
struct TxtBody {
    content: Option<String>,
}

/// Non-empty `content` from a JSON request body
fn content_from(body: &[u8]) -> HttpResult<String> {
    let body: TxtBody = serde_json::from_slice(body)
        .map_err(|e| HttpError::bad_request(format!("invalid JSON body: {}", e)))?;

    match body.content {
        Some(content) if !content.is_empty() => Ok(content),
        _ => Err(HttpError::bad_request("content is required")),
    }
}

pub async fn list(
    State(state): State<AppState>,
    Path(hostname): Path<String>,
) -> HttpResult<impl IntoResponse> {
    let hostname = Hostname::parse(&hostname)?;
    let records = state.engine.list_for(&hostname, RecordType::Txt).await?;
    Ok(Json(records))
}

pub async fn replace(
    State(state): State<AppState>,
    Path(hostname): Path<String>,
    body: Bytes,
) -> HttpResult<impl IntoResponse> {
    let hostname = Hostname::parse(&hostname)?;
    let content = content_from(&body)?;

    state
        .engine
        .reconcile_replace(&hostname, RecordType::Txt, &content)
        .await?;
    Ok(Json(json!({ "status": "ok" })))
}

pub async fn converge(
    State(state): State<AppState>,
    Path(hostname): Path<String>,
    body: Bytes,
) -> HttpResult<impl IntoResponse> {
    let hostname = Hostname::parse(&hostname)?;
    let content = content_from(&body)?;

    let outcomes = state
        .engine
        .reconcile_converge(&hostname, &[DesiredRecord::txt(content)])
        .await?;
    let changed = outcomes.iter().any(ReconcileOutcome::applied);
    Ok(Json(json!({ "status": "ok", "changed": changed })))
}

pub async fn clear(
    State(state): State<AppState>,
    Path(hostname): Path<String>,
) -> HttpResult<impl IntoResponse> {
    let hostname = Hostname::parse(&hostname)?;
    let deleted = match state.engine.clear(&hostname, RecordType::Txt).await? {
        ReconcileOutcome::Cleared { deleted } => deleted,
        _ => 0,
    };
    Ok(Json(json!({ "status": "ok", "deleted": deleted })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn content_must_be_present_and_non_empty() {
        assert_eq!(content_from(br#"{"content":"abc"}"#).unwrap(), "abc");

        for body in [&b""[..], b"{}", br#"{"content":""}"#, br#"{"content":null}"#, b"nope"] {
            assert_eq!(content_from(body).unwrap_err().status(), StatusCode::BAD_REQUEST);
        }
    }
}
