use axum::{
    extract::State,
    response::Response,
    routing::post,
    Json, Router,
};
use drive_catalog::parse_booking_instant;
use drive_core::UpstreamRequest;
use drive_reservation::notify::notice_for_hold;
use drive_shared::models::events::NoticeKind;
use drive_store::paths;
use serde_json::Value;
use crate::{proxy, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/reservation", post(create_reservation))
}

/// POST /api/reservation
///
/// Pass-through to the backend's reservation endpoint. A booking made with
/// a bearer token is firm on the backend, so it is also recorded in the
/// hold ledger where it overrides overlapping soft holds.
pub async fn create_reservation(
    State(state): State<AppState>,
    bearer: proxy::MaybeBearer,
    Json(body): Json<Value>,
) -> Response {
    let bearer = proxy::bearer_token(bearer);
    let signed_in = bearer.is_some();

    let request = UpstreamRequest::post(paths::RESERVATION_NEW, body.clone()).with_bearer(bearer);
    let reply = match proxy::forward(&state, request).await {
        Ok(reply) => reply,
        Err(e) => return proxy::transport_failure("Failed to create reservation", &e),
    };

    if signed_in && reply.is_success() {
        let reservation_ref = reply
            .json_body()
            .and_then(|created| created.get("id").and_then(scalar_text));
        record_firm_booking(&state, &body, reservation_ref).await;
    }

    proxy::relay_reservation(&reply)
}

pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

async fn record_firm_booking(state: &AppState, body: &Value, reservation_ref: Option<String>) {
    let field = |name: &str| body.get(name).and_then(scalar_text);
    let (Some(car_id), Some(start), Some(end)) = (field("car"), field("start_date"), field("end_date")) else {
        return;
    };
    let (Ok(pickup), Ok(return_at)) = (parse_booking_instant(&start), parse_booking_instant(&end)) else {
        tracing::warn!("Firm booking for car {} has unreadable dates; not recorded", car_id);
        return;
    };

    let now = state.clock.now();
    let outcome = state
        .holds
        .lock()
        .await
        .record_firm(&car_id, pickup, return_at, reservation_ref, now);

    if outcome.overridden.is_empty() {
        return;
    }
    let car = state.cached_car(&car_id).await;
    for hold in &outcome.overridden {
        if let Err(e) = state.sessions.discard_pending(&hold.id.to_string()).await {
            tracing::warn!("Failed to discard pending reservation {}: {}", hold.id, e);
        }
        state.publish(notice_for_hold(hold, NoticeKind::Overridden, car.as_ref(), now));
    }
}
