use std::convert::Infallible;
use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use futures_util::stream::Stream;
use serde::Deserialize;
use tokio_stream::{wrappers::BroadcastStream, StreamExt};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/events", get(stream_notices))
}

#[derive(Debug, Deserialize)]
pub struct NoticeFilter {
    pub car_id: Option<String>,
}

/// GET /v1/events
/// Reservation notices as server-sent events, optionally for one car.
pub async fn stream_notices(
    State(state): State<AppState>,
    Query(filter): Query<NoticeFilter>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.sse_tx.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(move |result| {
        // Lagged receivers skip what they missed.
        let notice = result.ok()?;
        if let Some(car_id) = &filter.car_id {
            if &notice.car_id != car_id {
                return None;
            }
        }
        Event::default()
            .event(notice.kind.as_str())
            .json_data(&notice)
            .ok()
            .map(Ok)
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
