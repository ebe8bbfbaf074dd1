use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use drive_catalog::Car;
use drive_core::{HttpMethod, UpstreamReply, UpstreamRequest};
use drive_reservation::notify::notice_for_reservation;
use drive_reservation::{
    action_for, plan_transition, DashboardAction, DashboardReport, Reservation, ReservationError,
    ReservationStatus,
};
use drive_store::paths;
use serde_json::{json, Value};
use crate::{cars::load_cars, error::AppError, proxy, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/dashboard/cars", get(list_cars).post(add_car))
        .route("/v1/dashboard/cars/{id}", put(update_car).delete(delete_car))
        .route("/v1/dashboard/cars/{id}/toggle-availability", post(toggle_availability))
        .route("/v1/dashboard/reservations", get(list_reservations))
        .route(
            "/v1/dashboard/reservations/{id}",
            get(get_reservation).patch(update_reservation),
        )
        .route("/v1/dashboard/reservations/{id}/confirm", post(confirm_reservation))
        .route("/v1/dashboard/reservations/{id}/cancel", post(cancel_reservation))
        .route("/v1/dashboard/reports", get(reports))
}

async fn send(state: &AppState, request: UpstreamRequest, context: &str) -> Result<UpstreamReply, AppError> {
    proxy::forward(state, request)
        .await
        .map_err(|e| AppError::Relayed(proxy::transport_failure(context, &e)))
}

// ============================================================================
// Cars
// ============================================================================

/// GET /v1/dashboard/cars
/// Always fresh; the dashboard must see what the backend has.
pub async fn list_cars(State(state): State<AppState>, bearer: proxy::MaybeBearer) -> Result<Response, AppError> {
    let request = UpstreamRequest::get(paths::CARS).with_bearer(proxy::bearer_token(bearer));
    let reply = send(&state, request, "Failed to fetch cars").await?;
    Ok(proxy::relay_json(&reply))
}

/// POST /v1/dashboard/cars
pub async fn add_car(
    State(state): State<AppState>,
    bearer: proxy::MaybeBearer,
    Json(body): Json<Value>,
) -> Result<Response, AppError> {
    let request = UpstreamRequest::post(paths::CAR_NEW, body).with_bearer(proxy::bearer_token(bearer));
    let reply = send(&state, request, "Failed to add car").await?;
    after_car_mutation(&state, &reply).await;
    Ok(proxy::relay_json(&reply))
}

/// PUT /v1/dashboard/cars/{id}
pub async fn update_car(
    State(state): State<AppState>,
    Path(id): Path<String>,
    bearer: proxy::MaybeBearer,
    Json(body): Json<Value>,
) -> Result<Response, AppError> {
    let request = UpstreamRequest::new(HttpMethod::Put, paths::car_update(&id))
        .with_body(body)
        .with_bearer(proxy::bearer_token(bearer));
    let reply = send(&state, request, "Failed to update car").await?;
    after_car_mutation(&state, &reply).await;
    Ok(proxy::relay_json(&reply))
}

/// DELETE /v1/dashboard/cars/{id}
pub async fn delete_car(
    State(state): State<AppState>,
    Path(id): Path<String>,
    bearer: proxy::MaybeBearer,
) -> Result<Response, AppError> {
    let request = UpstreamRequest::new(HttpMethod::Delete, paths::car_delete(&id))
        .with_bearer(proxy::bearer_token(bearer));
    let reply = send(&state, request, "Failed to delete car").await?;
    after_car_mutation(&state, &reply).await;

    // DRF answers a delete with 204 and no body.
    if reply.is_success() && reply.body.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    Ok(proxy::relay_json(&reply))
}

/// POST /v1/dashboard/cars/{id}/toggle-availability
/// available <-> unavailable; a reserved car stays as it is.
pub async fn toggle_availability(
    State(state): State<AppState>,
    Path(id): Path<String>,
    bearer: proxy::MaybeBearer,
) -> Result<Response, AppError> {
    let bearer = proxy::bearer_token(bearer);

    let request = UpstreamRequest::get(paths::car(&id)).with_bearer(bearer.clone());
    let reply = send(&state, request, "Failed to fetch car details").await?;
    if !reply.is_success() {
        return Ok(proxy::relay_json(&reply));
    }
    let car: Car = reply
        .json_body()
        .and_then(|body| serde_json::from_value(body).ok())
        .ok_or_else(|| AppError::InternalServerError(format!("Unreadable car {}", id)))?;

    let next = car.status.toggled().ok_or_else(|| {
        AppError::ConflictError(format!("{} is reserved and cannot be toggled", car.display_name()))
    })?;

    let request = UpstreamRequest::new(HttpMethod::Patch, paths::car_update(&id))
        .with_body(json!({ "status": next.as_str() }))
        .with_bearer(bearer);
    let reply = send(&state, request, "Failed to update car").await?;
    after_car_mutation(&state, &reply).await;

    tracing::info!("Car {} toggled {} -> {}", id, car.status.as_str(), next.as_str());
    Ok(proxy::relay_json(&reply))
}

async fn after_car_mutation(state: &AppState, reply: &UpstreamReply) {
    if reply.is_success() {
        state.catalog.invalidate().await;
    }
}

// ============================================================================
// Reservations
// ============================================================================

/// GET /v1/dashboard/reservations
pub async fn list_reservations(
    State(state): State<AppState>,
    bearer: proxy::MaybeBearer,
) -> Result<Response, AppError> {
    let request = UpstreamRequest::get(paths::RESERVATIONS).with_bearer(proxy::bearer_token(bearer));
    let reply = send(&state, request, "Failed to fetch reservations").await?;
    Ok(proxy::relay_json(&reply))
}

/// GET /v1/dashboard/reservations/{id}
pub async fn get_reservation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    bearer: proxy::MaybeBearer,
) -> Result<Response, AppError> {
    let request = UpstreamRequest::get(paths::reservation(&id)).with_bearer(proxy::bearer_token(bearer));
    let reply = send(&state, request, "Failed to fetch reservation").await?;
    Ok(proxy::relay_json(&reply))
}

/// PATCH /v1/dashboard/reservations/{id}
/// Field edits pass through; a `status` in the body must be a legal move
/// from the current status.
pub async fn update_reservation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    bearer: proxy::MaybeBearer,
    Json(mut body): Json<Value>,
) -> Result<Response, AppError> {
    let bearer = proxy::bearer_token(bearer);
    let current = current_reservation(&state, &id, bearer.clone()).await?;
    let mut cancelling = false;

    if let Some(raw) = body.get("status").and_then(Value::as_str) {
        let target = raw
            .parse::<ReservationStatus>()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        if target != current.status {
            let action = action_for(target)
                .ok_or_else(|| AppError::ConflictError(format!("Reservation {} cannot move back to {}", id, target)))?;
            plan_transition(&current, action).map_err(AppError::from_reservation)?;
        }
        body["status"] = json!(target.as_backend_str());
        cancelling = target == ReservationStatus::Cancelled;
    }

    let request = UpstreamRequest::new(HttpMethod::Patch, paths::reservation_update(&id))
        .with_body(body)
        .with_bearer(bearer);
    let reply = send(&state, request, "Failed to update reservation").await?;

    if reply.is_success() {
        if cancelling {
            release_firm_holds(&state, &id).await;
        }
        let updated = reply
            .json_body()
            .and_then(|body| serde_json::from_value::<Reservation>(body).ok());
        if let Some(updated) = updated {
            if updated.status != current.status {
                notify(&state, &updated).await;
            }
        }
    }
    Ok(proxy::relay_json(&reply))
}

/// POST /v1/dashboard/reservations/{id}/confirm
pub async fn confirm_reservation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    bearer: proxy::MaybeBearer,
) -> Result<Response, AppError> {
    let bearer = proxy::bearer_token(bearer);
    let mut reservation = current_reservation(&state, &id, bearer.clone()).await?;
    let target = plan_transition(&reservation, DashboardAction::Confirm).map_err(AppError::from_reservation)?;

    let request = UpstreamRequest::new(HttpMethod::Patch, paths::reservation_update(&id))
        .with_body(json!({ "status": target.as_backend_str() }))
        .with_bearer(bearer);
    let reply = send(&state, request, "Failed to confirm reservation").await?;

    if reply.is_success() {
        reservation.status = target;
        notify(&state, &reservation).await;
    }
    Ok(proxy::relay_json(&reply))
}

/// POST /v1/dashboard/reservations/{id}/cancel
pub async fn cancel_reservation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    bearer: proxy::MaybeBearer,
) -> Result<Response, AppError> {
    let bearer = proxy::bearer_token(bearer);
    let mut reservation = current_reservation(&state, &id, bearer.clone()).await?;
    let target = plan_transition(&reservation, DashboardAction::Cancel).map_err(AppError::from_reservation)?;

    let request = UpstreamRequest::post(paths::reservation_cancel(&id), json!({})).with_bearer(bearer);
    let reply = send(&state, request, "Failed to cancel reservation").await?;

    if reply.is_success() {
        release_firm_holds(&state, &id).await;
        reservation.status = target;
        notify(&state, &reservation).await;
    }
    Ok(proxy::relay_json(&reply))
}

/// The reservation as the backend has it now. Backend errors are relayed.
async fn current_reservation(state: &AppState, id: &str, bearer: Option<String>) -> Result<Reservation, AppError> {
    let request = UpstreamRequest::get(paths::reservation(id)).with_bearer(bearer);
    let reply = send(state, request, "Failed to fetch reservation").await?;

    if !reply.is_success() {
        return Err(AppError::Relayed(proxy::relay_json(&reply)));
    }
    let body = reply
        .json_body()
        .ok_or_else(|| AppError::Relayed(proxy::relay_json(&reply)))?;

    serde_json::from_value(body)
        .map_err(|e| AppError::from_reservation(ReservationError::Malformed(format!("{}: {}", id, e))))
}

/// A cancelled reservation no longer blocks its dates for soft holds.
async fn release_firm_holds(state: &AppState, reservation_id: &str) {
    let released = state.holds.lock().await.release(reservation_id, state.clock.now());
    for hold in &released {
        tracing::info!(
            "Released firm hold {} on car {} after reservation {} was cancelled",
            hold.id,
            hold.car_id,
            reservation_id
        );
    }
}

async fn notify(state: &AppState, reservation: &Reservation) {
    let car = match reservation.car.as_deref() {
        Some(car_id) => state.cached_car(car_id).await,
        None => None,
    };
    if let Some(notice) = notice_for_reservation(reservation, car.as_ref(), state.clock.now()) {
        state.publish(notice);
    }
}

// ============================================================================
// Reports
// ============================================================================

/// GET /v1/dashboard/reports
pub async fn reports(
    State(state): State<AppState>,
    bearer: proxy::MaybeBearer,
) -> Result<Json<DashboardReport>, AppError> {
    let request = UpstreamRequest::get(paths::RESERVATIONS).with_bearer(proxy::bearer_token(bearer));
    let reply = send(&state, request, "Failed to fetch reservations").await?;
    if !reply.is_success() {
        return Err(AppError::Relayed(proxy::relay_json(&reply)));
    }

    let listing = reply
        .json_body()
        .ok_or_else(|| AppError::Relayed(proxy::invalid_response(&reply, "Reservation listing is not JSON")))?;
    let reservations = parse_reservations(listing);
    let cars = load_cars(&state).await?;

    Ok(Json(DashboardReport::build(&reservations, &cars)))
}

fn parse_reservations(listing: Value) -> Vec<Reservation> {
    let items = match listing {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("results") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<Reservation>(item) {
            Ok(reservation) => Some(reservation),
            Err(e) => {
                tracing::warn!("Skipping unreadable reservation: {}", e);
                None
            }
        })
        .collect()
}
