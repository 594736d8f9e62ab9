use super::common::*;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::{Extension, Router};
use chrono::Duration;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::workflows::appointments::appointment_router;
use crate::workflows::identity::Principal;

fn router(world: &World) -> Router {
    appointment_router(world.service.clone()).layer(Extension(world.authenticator()))
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.expect("router responds");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

fn booking(world: &World, offset: Duration) -> Value {
    json!({
        "estateId": world.estate.0,
        "appointmentDate": (start() + offset).to_rfc3339(),
        "message": "Can I bring an architect?"
    })
}

#[tokio::test]
async fn create_route_requires_bearer_token() {
    let world = World::new();
    let request = Request::post("/api/appointments")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(booking(&world, Duration::days(1)).to_string()))
        .expect("request");

    let (status, body) = send(router(&world), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn create_route_books_and_reports_conflicts() {
    let world = World::new();
    let post = |principal: &Principal| {
        Request::post("/api/appointments")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, world.bearer(principal))
            .body(Body::from(booking(&world, Duration::days(1)).to_string()))
            .expect("request")
    };

    let (status, body) = send(router(&world), post(&world.client)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "PENDING");
    assert_eq!(body["estate"]["id"], world.estate.0);

    let (status, body) = send(router(&world), post(&world.other_client)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], 409);
}

#[tokio::test]
async fn confirm_route_accepts_missing_body() {
    let world = World::new();
    let booked = world
        .service
        .create(&world.client, world.request(Duration::days(1)))
        .expect("booking");

    let request = Request::patch(format!("/api/appointments/{}/confirm", booked.id))
        .header(header::AUTHORIZATION, world.bearer(&world.seller))
        .body(Body::empty())
        .expect("request");
    let (status, body) = send(router(&world), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "CONFIRMED");
}

#[tokio::test]
async fn pending_count_route_is_seller_only() {
    let world = World::new();
    world
        .service
        .create(&world.client, world.request(Duration::days(1)))
        .expect("booking");

    let request = |principal: &Principal| {
        Request::get("/api/appointments/pending/count")
            .header(header::AUTHORIZATION, world.bearer(principal))
            .body(Body::empty())
            .expect("request")
    };

    let (status, body) = send(router(&world), request(&world.seller)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "pending": 1 }));

    let (status, _) = send(router(&world), request(&world.client)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn my_requests_route_pages_results() {
    let world = World::new();
    for days in 1..=3 {
        world
            .service
            .create(&world.client, world.request(Duration::days(days)))
            .expect("booking");
    }

    let request = Request::get("/api/appointments/my-requests?page=1&size=2")
        .header(header::AUTHORIZATION, world.bearer(&world.client))
        .body(Body::empty())
        .expect("request");
    let (status, body) = send(router(&world), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalElements"], 3);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["content"].as_array().map(Vec::len), Some(1));
}
