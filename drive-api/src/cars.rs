use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use drive_catalog::Car;
use drive_core::UpstreamRequest;
use drive_store::{catalog_cache::parse_cars, paths};
use crate::{error::AppError, proxy, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/available-cars", get(list_cars))
        .route("/api/available-cars/{id}", get(get_car))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/available-cars
pub async fn list_cars(State(state): State<AppState>) -> Response {
    match fetch_listing(&state).await {
        Ok(listing) => Json(listing).into_response(),
        Err(response) => response,
    }
}

/// GET /api/available-cars/{id}
pub async fn get_car(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    const CONTEXT: &str = "Failed to fetch car details";

    let reply = match proxy::forward(&state, UpstreamRequest::get(paths::car(&id))).await {
        Ok(reply) => reply,
        Err(e) => return proxy::transport_failure(CONTEXT, &e),
    };

    match proxy::catalog_body(&reply, CONTEXT) {
        Ok(car) => Json(car).into_response(),
        Err(response) => response,
    }
}

// ============================================================================
// Catalog access shared with other routes
// ============================================================================

/// The car listing, from cache when fresh.
async fn fetch_listing(state: &AppState) -> Result<serde_json::Value, Response> {
    const CONTEXT: &str = "Failed to fetch cars";

    if let Some(listing) = state.catalog.get().await {
        return Ok(listing);
    }

    let reply = proxy::forward(state, UpstreamRequest::get(paths::CARS))
        .await
        .map_err(|e| proxy::transport_failure(CONTEXT, &e))?;
    let listing = proxy::catalog_body(&reply, CONTEXT)?;

    state.catalog.put(listing.clone()).await;
    Ok(listing)
}

pub async fn load_cars(state: &AppState) -> Result<Vec<Car>, AppError> {
    let listing = fetch_listing(state).await.map_err(AppError::Relayed)?;
    Ok(parse_cars(&listing))
}

/// One car, from the cached listing or the backend's detail endpoint.
pub async fn load_car(state: &AppState, car_id: &str) -> Result<Car, AppError> {
    if let Some(car) = state.cached_car(car_id).await {
        return Ok(car);
    }

    let reply = proxy::forward(state, UpstreamRequest::get(paths::car(car_id)))
        .await
        .map_err(|e| AppError::Relayed(proxy::transport_failure("Failed to fetch car details", &e)))?;

    if reply.status == 404 {
        return Err(AppError::NotFoundError(format!("Car not found: {}", car_id)));
    }
    let body = proxy::catalog_body(&reply, "Failed to fetch car details").map_err(AppError::Relayed)?;

    serde_json::from_value(body)
        .map_err(|e| AppError::InternalServerError(format!("Unreadable car {}: {}", car_id, e)))
}
