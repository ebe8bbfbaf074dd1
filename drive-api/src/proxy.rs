//! Relay policies for backend replies.
//!
//! Every gateway route that talks to the backend ends in one of these
//! functions, so the response envelopes stay consistent across routes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use drive_core::{BoxError, UpstreamReply, UpstreamRequest};
use serde_json::{json, Value};
use crate::state::AppState;

const PREVIEW_CHARS: usize = 200;

/// The caller's backend token, if any. Forwarded untouched.
pub type MaybeBearer = Option<TypedHeader<Authorization<Bearer>>>;

pub fn bearer_token(header: MaybeBearer) -> Option<String> {
    header.map(|TypedHeader(Authorization(bearer))| bearer.token().to_string())
}

pub async fn forward(state: &AppState, request: UpstreamRequest) -> Result<UpstreamReply, BoxError> {
    state.upstream.send(request).await
}

fn status_of(reply: &UpstreamReply) -> StatusCode {
    StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY)
}

/// 500 envelope for a reply whose body is not JSON (typically an HTML
/// error page).
pub fn invalid_response(reply: &UpstreamReply, message: &str) -> Response {
    tracing::error!("Non-JSON response ({}): {}", reply.status, reply.preview(500));
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "API returned invalid response",
            "message": message,
            "status": reply.status,
            "responsePreview": reply.preview(PREVIEW_CHARS),
        })),
    )
        .into_response()
}

/// 500 envelope for a request that never got an HTTP answer.
pub fn transport_failure(context: &str, err: &BoxError) -> Response {
    tracing::error!("{}: {}", context, err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": context,
            "message": err.to_string(),
        })),
    )
        .into_response()
}

/// Pass-through: status and JSON body unchanged.
pub fn relay_json(reply: &UpstreamReply) -> Response {
    match reply.json_body() {
        Some(body) => (status_of(reply), Json(body)).into_response(),
        None => invalid_response(reply, "The backend did not return JSON."),
    }
}

/// Reservation creation: success passes through, a JSON error is wrapped
/// with the backend's own body under `details`.
pub fn relay_reservation(reply: &UpstreamReply) -> Response {
    let Some(body) = reply.json_body() else {
        return invalid_response(
            reply,
            "The reservation endpoint is not responding correctly. Please check the API endpoint.",
        );
    };

    if reply.is_success() {
        return (status_of(reply), Json(body)).into_response();
    }

    tracing::error!("Reservation rejected by backend ({}): {}", reply.status, body);
    (
        status_of(reply),
        Json(json!({
            "error": "Failed to create reservation",
            "details": body,
            "status": reply.status,
        })),
    )
        .into_response()
}

/// Catalog reads: anything but a 2xx JSON reply becomes a 500 with a
/// short reason. Returns the parsed body on success.
pub fn catalog_body(reply: &UpstreamReply, context: &str) -> Result<Value, Response> {
    let failure = |message: String| {
        tracing::error!("{}: {}", context, message);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": context, "message": message })),
        )
            .into_response()
    };

    if !reply.is_success() {
        return Err(failure(format!("API returned status: {}", reply.status)));
    }
    reply
        .json_body()
        .ok_or_else(|| failure("API returned a non-JSON body".to_string()))
}
