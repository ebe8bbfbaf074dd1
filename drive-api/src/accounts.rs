use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use drive_core::account::{SigninForm, SignupForm};
use drive_core::UpstreamRequest;
use drive_shared::Masked;
use drive_store::paths;
use serde::Deserialize;
use serde_json::json;
use crate::{error::AppError, proxy, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/authentication/signupAuth", post(signup))
        .route("/api/authentication/signinAuth", post(signin))
        .route("/api/v1/account/auth/activation", get(activate))
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ActivationParams {
    pub uid: Option<String>,
    pub token: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/authentication/signupAuth
pub async fn signup(
    State(state): State<AppState>,
    Json(form): Json<SignupForm>,
) -> Result<Response, AppError> {
    form.check().map_err(AppError::Validation)?;
    tracing::info!("Signup for {}", Masked(form.email.as_str()));

    let body = serde_json::to_value(&form)?;
    let generic_failure = || {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Something went wrong during signup." })),
        )
            .into_response()
    };

    let reply = match proxy::forward(&state, UpstreamRequest::post(paths::SIGNUP, body)).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!("Signup error: {}", e);
            return Ok(generic_failure());
        }
    };

    let Some(data) = reply.json_body() else {
        tracing::error!("Signup error: non-JSON reply ({})", reply.status);
        return Ok(generic_failure());
    };

    if !reply.is_success() {
        let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
        return Ok((status, Json(json!({ "error": data }))).into_response());
    }

    Ok((StatusCode::CREATED, Json(data)).into_response())
}

/// POST /api/authentication/signinAuth
pub async fn signin(
    State(state): State<AppState>,
    Json(form): Json<SigninForm>,
) -> Result<Response, AppError> {
    form.check().map_err(AppError::Validation)?;

    let body = serde_json::to_value(&form)?;
    let reply = proxy::forward(&state, UpstreamRequest::post(paths::SIGNIN, body))
        .await
        .map_err(|e| AppError::Relayed(proxy::transport_failure("Failed to sign in", &e)))?;

    Ok(proxy::relay_json(&reply))
}

/// GET /api/v1/account/auth/activation?uid=..&token=..
///
/// Target of the activation e-mail link. Always answers with a redirect.
pub async fn activate(
    State(state): State<AppState>,
    Query(params): Query<ActivationParams>,
) -> Redirect {
    let (Some(uid), Some(token)) = (
        params.uid.filter(|v| !v.is_empty()),
        params.token.filter(|v| !v.is_empty()),
    ) else {
        return Redirect::temporary("/login?error=invalid_activation_link");
    };

    let request = UpstreamRequest::post(paths::ACTIVATION, json!({ "uid": uid, "token": token }));
    match proxy::forward(&state, request).await {
        Ok(reply) if reply.is_success() => Redirect::temporary("/auth/Signin?success=account_activated"),
        Ok(reply) => {
            let detail = reply.json_body().unwrap_or_else(|| json!({ "message": reply.preview(200) }));
            tracing::error!("Activation failed: {}", detail);
            Redirect::temporary("/auth/Signin?error=activation_failed")
        }
        Err(e) => {
            tracing::error!("Activation error: {}", e);
            Redirect::temporary("/auth/Signin?error=activation_error")
        }
    }
}
