use axum::{
    extract::Path,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use drive_core::{Upstream, UpstreamRequest};
use drive_store::{paths, BackendClient};
use serde_json::{json, Value};

async fn spawn_backend() -> String {
    let app = Router::new()
        .route(
            "/api/v1/car/",
            get(|| async { Json(json!([{"id": 1, "name": "Kia", "price_per_day": 500.0, "status": "available"}])) }),
        )
        .route(
            "/api/v1/car/{id}/",
            get(|Path(id): Path<String>| async move {
                if id == "404" {
                    (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response()
                } else {
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        [(header::CONTENT_TYPE, "text/html")],
                        "<html>Server Error</html>",
                    )
                        .into_response()
                }
            }),
        )
        .route(
            "/api/v1/reservation/new/",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                let auth = headers
                    .get(header::AUTHORIZATION)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("")
                    .to_string();
                (StatusCode::CREATED, Json(json!({"id": 77, "echo": body, "auth": auth})))
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_json_listing_is_relayed() {
    let client = BackendClient::new(spawn_backend().await, 5).unwrap();

    let reply = client.send(UpstreamRequest::get(paths::CARS)).await.unwrap();
    assert_eq!(reply.status, 200);
    assert!(reply.is_json());
    assert_eq!(reply.json_body().unwrap()[0]["name"], "Kia");
}

#[tokio::test]
async fn test_error_statuses_and_html_come_back_as_replies() {
    let client = BackendClient::new(spawn_backend().await, 5).unwrap();

    let missing = client.send(UpstreamRequest::get(paths::car("404"))).await.unwrap();
    assert_eq!(missing.status, 404);
    assert!(missing.is_json());

    let html = client.send(UpstreamRequest::get(paths::car("1"))).await.unwrap();
    assert_eq!(html.status, 500);
    assert!(!html.is_json());
    assert!(html.preview(200).starts_with("<html>"));
}

#[tokio::test]
async fn test_body_and_bearer_are_forwarded() {
    let client = BackendClient::new(spawn_backend().await, 5).unwrap();

    let reply = client
        .send(
            UpstreamRequest::post(paths::RESERVATION_NEW, json!({"car": "1"}))
                .with_bearer(Some("abc".to_string())),
        )
        .await
        .unwrap();
    assert_eq!(reply.status, 201);

    let body = reply.json_body().unwrap();
    assert_eq!(body["echo"]["car"], "1");
    assert_eq!(body["auth"], "Bearer abc");
}

#[tokio::test]
async fn test_unreachable_backend_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = BackendClient::new(format!("http://{}", addr), 2).unwrap();
    assert!(client.send(UpstreamRequest::get(paths::CARS)).await.is_err());
}
