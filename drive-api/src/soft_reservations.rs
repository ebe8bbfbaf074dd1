use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use drive_core::UpstreamRequest;
use drive_reservation::notify::notice_for_hold;
use drive_reservation::{HoldState, PendingReservation, ReservationForm, SoftHold};
use drive_shared::models::events::NoticeKind;
use drive_shared::Masked;
use drive_store::paths;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use crate::{
    auth::{issue_hold_token, verify_hold_token},
    cars::load_car,
    error::AppError,
    proxy,
    reservations::scalar_text,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/soft-reservations", post(place_soft_reservation))
        .route("/v1/soft-reservations/{id}", get(get_soft_reservation))
        .route("/v1/soft-reservations/{id}/pending", get(get_pending_reservation))
        .route("/v1/soft-reservations/{id}/confirm", post(confirm_soft_reservation))
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct SoftReservationResponse {
    pub hold_id: Uuid,
    pub hold_token: String,
    pub expires_at: DateTime<Utc>,
    pub total_days: u32,
    pub total_price: f64,
    pub pending: PendingReservation,
}

#[derive(Debug, Serialize)]
pub struct HoldStatusResponse {
    pub hold: SoftHold,
    pub pending: Option<PendingReservation>,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub hold_token: String,
}

#[derive(Debug, Serialize)]
pub struct ConfirmResponse {
    pub hold: SoftHold,
    pub reservation: Value,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/soft-reservations
/// Validate the form, price it, hold the car and keep the snapshot.
pub async fn place_soft_reservation(
    State(state): State<AppState>,
    Json(form): Json<ReservationForm>,
) -> Result<(StatusCode, Json<SoftReservationResponse>), AppError> {
    let now = state.clock.now();
    let validated = form.check(now.date_naive()).map_err(AppError::Validation)?;

    let car = load_car(&state, &validated.form.car).await?;
    if !car.is_reservable() {
        return Err(AppError::ConflictError(format!(
            "{} is not available for reservation",
            car.display_name()
        )));
    }
    let quote = validated
        .quote(&car)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let hold = state
        .holds
        .lock()
        .await
        .place_soft(
            &car.id,
            validated.pickup,
            validated.return_at,
            Some(validated.form.customer_email.clone()),
            now,
        )
        .map_err(AppError::from_hold)?;

    let HoldState::SoftReserved { expires_at } = hold.state else {
        return Err(AppError::InternalServerError(format!("Hold {} placed in state {}", hold.id, hold.state.name())));
    };

    let pending = PendingReservation::new(hold.id, &validated, car, quote, now);
    let hold_token = match persist_hold(&state, &hold, &pending, expires_at).await {
        Ok(token) => token,
        Err(e) => {
            // Without a snapshot and a token nobody can convert the hold.
            state.holds.lock().await.withdraw(&hold.id);
            return Err(e);
        }
    };

    tracing::info!(
        "Soft hold {} on car {} for {} ({} days, {:.2})",
        hold.id,
        hold.car_id,
        Masked(validated.form.customer_email.as_str()),
        quote.total_days,
        quote.total_price
    );

    Ok((
        StatusCode::CREATED,
        Json(SoftReservationResponse {
            hold_id: hold.id,
            hold_token,
            expires_at,
            total_days: quote.total_days,
            total_price: quote.total_price,
            pending,
        }),
    ))
}

/// GET /v1/soft-reservations/{id}
pub async fn get_soft_reservation(
    State(state): State<AppState>,
    Path(hold_id): Path<Uuid>,
) -> Result<Json<HoldStatusResponse>, AppError> {
    let now = state.clock.now();
    let hold = state
        .holds
        .lock()
        .await
        .get(&hold_id, now)
        .ok_or_else(|| AppError::NotFoundError(format!("Soft reservation not found: {}", hold_id)))?;

    let pending = match hold.state {
        HoldState::SoftReserved { .. } => load_pending(&state, hold_id).await?,
        _ => None,
    };

    Ok(Json(HoldStatusResponse { hold, pending }))
}

/// GET /v1/soft-reservations/{id}/pending
/// The snapshot as it was saved, for resuming after signup.
pub async fn get_pending_reservation(
    State(state): State<AppState>,
    Path(hold_id): Path<Uuid>,
) -> Result<Json<PendingReservation>, AppError> {
    let now = state.clock.now();
    state
        .holds
        .lock()
        .await
        .ensure_convertible(&hold_id, now)
        .map_err(AppError::from_hold)?;

    load_pending(&state, hold_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::GoneError(format!("Pending reservation for {} is no longer available", hold_id)))
}

/// POST /v1/soft-reservations/{id}/confirm
/// Soft -> firm: replays the snapshot to the backend with the customer's
/// token. A backend rejection leaves the hold soft so the call can be
/// retried.
pub async fn confirm_soft_reservation(
    State(state): State<AppState>,
    Path(hold_id): Path<Uuid>,
    bearer: proxy::MaybeBearer,
    Json(req): Json<ConfirmRequest>,
) -> Result<Response, AppError> {
    let bearer = proxy::bearer_token(bearer)
        .ok_or_else(|| AppError::AuthenticationError("Sign in to confirm this reservation".to_string()))?;
    verify_hold_token(&state.auth.hold_token_secret, &req.hold_token, hold_id)?;

    state
        .holds
        .lock()
        .await
        .ensure_convertible(&hold_id, state.clock.now())
        .map_err(AppError::from_hold)?;

    let pending = load_pending(&state, hold_id)
        .await?
        .ok_or_else(|| AppError::GoneError(format!("Pending reservation for {} is no longer available", hold_id)))?;
    let payload = pending
        .revalidated()
        .map_err(|e| AppError::InternalServerError(format!("Stored reservation unreadable: {}", e)))?
        .backend_payload();

    let request = UpstreamRequest::post(paths::RESERVATION_NEW, payload).with_bearer(Some(bearer));
    let reply = proxy::forward(&state, request)
        .await
        .map_err(|e| AppError::Relayed(proxy::transport_failure("Failed to create reservation", &e)))?;

    if !reply.is_success() {
        return Ok(proxy::relay_reservation(&reply));
    }
    let Some(reservation) = reply.json_body() else {
        return Ok(proxy::relay_reservation(&reply));
    };

    let now = state.clock.now();
    let reservation_ref = reservation.get("id").and_then(scalar_text);
    let outcome = state
        .holds
        .lock()
        .await
        .mark_firm(&hold_id, reservation_ref, now)
        .map_err(AppError::from_hold)?;

    if let Err(e) = state.sessions.discard_pending(&hold_id.to_string()).await {
        tracing::warn!("Failed to discard pending reservation {}: {}", hold_id, e);
    }

    let car = Some(&pending.car_details);
    state.publish(notice_for_hold(&outcome.hold, NoticeKind::Firm, car, now));
    for lost in &outcome.overridden {
        if let Err(e) = state.sessions.discard_pending(&lost.id.to_string()).await {
            tracing::warn!("Failed to discard pending reservation {}: {}", lost.id, e);
        }
        state.publish(notice_for_hold(lost, NoticeKind::Overridden, car, now));
    }

    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::CREATED);
    Ok((status, Json(ConfirmResponse { hold: outcome.hold, reservation })).into_response())
}

async fn persist_hold(
    state: &AppState,
    hold: &SoftHold,
    pending: &PendingReservation,
    expires_at: DateTime<Utc>,
) -> Result<String, AppError> {
    state
        .sessions
        .save_pending(&hold.id.to_string(), &pending.to_json()?, state.business_rules.soft_hold_seconds)
        .await
        .map_err(|e| AppError::InternalServerError(format!("Failed to store pending reservation: {}", e)))?;

    issue_hold_token(&state.auth.hold_token_secret, hold.id, &hold.car_id, expires_at)
}

async fn load_pending(state: &AppState, hold_id: Uuid) -> Result<Option<PendingReservation>, AppError> {
    let raw = state
        .sessions
        .load_pending(&hold_id.to_string())
        .await
        .map_err(|e| AppError::InternalServerError(format!("Failed to load pending reservation: {}", e)))?;

    match raw {
        Some(raw) => Ok(Some(PendingReservation::from_json(&raw)?)),
        None => Ok(None),
    }
}
