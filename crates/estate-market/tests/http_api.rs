use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

mod common {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use estate_market::config::AppConfig;
    use estate_market::infra::{InMemoryObjectStorage, InMemoryStore, RecordingMailer};
    use estate_market::workflows::ManualClock;
    use estate_market::{Marketplace, MarketplaceAdapters};

    pub struct Api {
        pub market: Marketplace,
        pub mailer: RecordingMailer,
    }

    pub fn api() -> Api {
        let config = AppConfig::for_tests();
        let mailer = RecordingMailer::new();
        let start = Utc
            .with_ymd_and_hms(2030, 9, 1, 7, 0, 0)
            .single()
            .expect("valid instant");
        let market = Marketplace::new(
            &config,
            MarketplaceAdapters {
                store: InMemoryStore::new(),
                mailer: Arc::new(mailer.clone()),
                storage: Arc::new(InMemoryObjectStorage::from_config(&config.storage)),
                clock: Arc::new(ManualClock::new(start)),
            },
        );
        Api { market, mailer }
    }
}

use common::*;

async fn call(
    api: &Api,
    method: Method,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request builds");

    let response = api
        .market
        .router()
        .oneshot(request)
        .await
        .expect("router responds");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

async fn signed_in(api: &Api, email: &str) -> String {
    let (status, _) = call(
        api,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "name": "Ines",
            "lastName": "Moura",
            "secondLastName": "Costa",
            "email": email,
            "password": "a long password"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let token = api
        .mailer
        .last_verification_token(email)
        .expect("verification mailed");
    let (status, _) = call(
        api,
        Method::GET,
        &format!("/api/auth/verify-email?token={token}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(
        api,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": "a long password" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["accessToken"]
        .as_str()
        .expect("access token in body")
        .to_string()
}

#[tokio::test]
async fn register_verify_login_and_me() {
    let api = api();
    let token = signed_in(&api, "ines@estate.test").await;

    let (status, body) = call(&api, Method::GET, "/api/auth/me", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "ines@estate.test");
    assert_eq!(body["emailVerified"], true);
    assert_eq!(body["roles"], json!(["USER"]));
    assert_eq!(body["secondLastName"], "Costa");
    assert_eq!(body["middleName"], Value::Null);

    let (status, body) = call(
        &api,
        Method::POST,
        "/api/auth/resend-verification",
        None,
        Some(json!({ "email": "ines@estate.test" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"], "ALREADY_VERIFIED");
}

#[tokio::test]
async fn login_before_verification_is_forbidden() {
    let api = api();
    let (status, _) = call(
        &api,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "name": "Tiago",
            "lastName": "Lopes",
            "email": "tiago@estate.test",
            "password": "a long password"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call(
        &api,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "tiago@estate.test", "password": "a long password" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "EMAIL_NOT_VERIFIED");
}

#[tokio::test]
async fn validation_failures_list_offending_fields() {
    let api = api();
    let (status, body) = call(
        &api,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "name": "",
            "lastName": "Lopes",
            "email": "nope",
            "password": "a long password"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_FAILED");
    assert!(body["errors"]["name"].is_string());
    assert!(body["errors"]["email"].is_string());
}

#[tokio::test]
async fn protected_routes_require_a_bearer_token() {
    let api = api();
    let (status, body) = call(&api, Method::GET, "/api/favorites", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], 401);

    let (status, _) = call(&api, Method::GET, "/api/auth/me", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_routes_reject_plain_members() {
    let api = api();
    let token = signed_in(&api, "member@estate.test").await;

    let (status, body) = call(
        &api,
        Method::GET,
        "/api/admin/sellers/pending",
        Some(token.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");

    let (status, _) = call(
        &api,
        Method::POST,
        "/api/categories",
        Some(token.as_str()),
        Some(json!({ "name": "Castle" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn public_catalogue_is_open_and_sort_fields_are_checked() {
    let api = api();

    let (status, body) = call(&api, Method::GET, "/api/estates/public/all", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalElements"], 0);
    assert_eq!(body["size"], 10);

    let (status, body) = call(
        &api,
        Method::GET,
        "/api/estates/public/search?sortBy=password&sortDir=ASC",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");

    let (status, body) = call(
        &api,
        Method::GET,
        "/api/estates/public/search?sortBy=price&sortDir=sideways",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .expect("message present")
        .contains("sort direction"));

    let (status, _) = call(
        &api,
        Method::GET,
        "/api/estates/public/all?size=500",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(&api, Method::GET, "/api/estates/public/42", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Estate not found with id: 42");

    let (status, body) = call(&api, Method::GET, "/api/categories", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn seller_application_round_trip_over_http() {
    let api = api();
    let token = signed_in(&api, "agent@estate.test").await;

    let (status, body) = call(
        &api,
        Method::POST,
        "/api/sellers/apply",
        Some(token.as_str()),
        Some(json!({ "city": "Coimbra", "address": "Rua Larga 3" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "PENDING");
    assert_eq!(body["userName"], "Ines Moura");

    let (status, body) = call(
        &api,
        Method::GET,
        "/api/sellers/application/status",
        Some(token.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["city"], "Coimbra");

    let (status, _) = call(
        &api,
        Method::POST,
        "/api/estates",
        Some(token.as_str()),
        Some(json!({
            "name": "Quinta",
            "description": "Farmhouse with olive trees",
            "price": 320000,
            "type": "SALE",
            "city": "Coimbra",
            "address": "Estrada 1",
            "categoryId": 1
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
