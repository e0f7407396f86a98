//! CI webhook and CI state endpoint handlers.
//!
//! `POST /api/ci/update` is the only way to change the CI state. The body is
//! merged permissively: anything that is not a JSON object, and any key that
//! is unknown or carries an empty value, is ignored rather than rejected.

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::HeaderMap,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

use crate::auth;
use crate::ci::CiSnapshot;
use crate::error::ApiError;
use crate::state::SharedState;

/// Query parameter carrying the CI token.
pub const TOKEN_QUERY_PARAM: &str = "token";

/// Response body of a successful CI update.
#[derive(Debug, Serialize)]
pub struct CiUpdateResponse {
    pub ok: bool,
    pub ts: DateTime<Utc>,
    pub state: CiSnapshot,
}

/// Handler for POST /api/ci/update.
#[instrument(skip_all)]
pub async fn ci_update_handler(
    State(state): State<SharedState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<CiUpdateResponse>, ApiError> {
    let from_query = query_token(query);
    let token = auth::extract_token(&headers, from_query.as_deref());
    if !state.ci_auth.validate(token) {
        let reason = if !state.ci_auth.is_enabled() {
            "no token configured"
        } else if token.is_none() {
            "missing token"
        } else {
            "invalid token"
        };
        warn!("Rejected CI update: {}", reason);
        return Err(ApiError::Unauthorized);
    }

    let fields = parse_update_body(&body);
    let ts = state.ci.update(&fields);
    info!("CI state updated ({} fields in payload)", fields.len());

    Ok(Json(CiUpdateResponse {
        ok: true,
        ts,
        state: state.ci.snapshot_with_defaults(&state.ci_defaults),
    }))
}

/// Handler for GET /api/ci.
pub async fn ci_state_handler(State(state): State<SharedState>) -> Json<CiSnapshot> {
    Json(state.ci.snapshot_with_defaults(&state.ci_defaults))
}

/// First `token` query parameter; an unparseable query string carries none.
fn query_token(query: Result<Query<Vec<(String, String)>>, QueryRejection>) -> Option<String> {
    match query {
        Ok(Query(pairs)) => pairs
            .into_iter()
            .find(|(key, _)| key == TOKEN_QUERY_PARAM)
            .map(|(_, value)| value),
        Err(e) => {
            debug!("Ignoring unparseable CI update query: {}", e);
            None
        }
    }
}

/// Extracts the update fields; a body that is not a JSON object is empty.
fn parse_update_body(body: &[u8]) -> Map<String, Value> {
    if body.is_empty() {
        return Map::new();
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) => fields,
        Ok(_) => {
            debug!("CI update body is not a JSON object, ignoring");
            Map::new()
        }
        Err(e) => {
            debug!("CI update body is not valid JSON, ignoring: {}", e);
            Map::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_update_body() {
        let fields = parse_update_body(br#"{"build": "Success", "extra": 1}"#);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["build"], "Success");

        assert!(parse_update_body(b"").is_empty());
        assert!(parse_update_body(b"[1, 2, 3]").is_empty());
        assert!(parse_update_body(b"not json").is_empty());
    }

    #[test]
    fn test_query_token_takes_first_value() {
        let pairs = vec![
            ("other".to_string(), "1".to_string()),
            ("token".to_string(), "first".to_string()),
            ("token".to_string(), "second".to_string()),
        ];
        assert_eq!(query_token(Ok(Query(pairs))), Some("first".to_string()));
        assert_eq!(query_token(Ok(Query(Vec::new()))), None);
    }
}
