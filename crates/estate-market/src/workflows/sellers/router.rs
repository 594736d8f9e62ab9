use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};

use super::domain::{SellerApplication, SellerId, SellerView, VerifySellerRequest};
use super::service::SellerService;
use crate::workflows::error::WorkflowError;
use crate::workflows::identity::Principal;

pub fn seller_router(service: Arc<SellerService>) -> Router {
    Router::new()
        .route("/api/sellers/apply", post(apply_handler))
        .route("/api/sellers/application/status", get(status_handler))
        .route("/api/admin/sellers/pending", get(pending_handler))
        .route("/api/admin/sellers/:seller_id", get(detail_handler))
        .route("/api/admin/sellers/:seller_id/verify", put(verify_handler))
        .with_state(service)
}

async fn apply_handler(
    State(service): State<Arc<SellerService>>,
    principal: Principal,
    Json(application): Json<SellerApplication>,
) -> Result<(StatusCode, Json<SellerView>), WorkflowError> {
    let view = service.apply(&principal, application)?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn status_handler(
    State(service): State<Arc<SellerService>>,
    principal: Principal,
) -> Result<Json<SellerView>, WorkflowError> {
    service.application_status(&principal).map(Json)
}

async fn pending_handler(
    State(service): State<Arc<SellerService>>,
    principal: Principal,
) -> Result<Json<Vec<SellerView>>, WorkflowError> {
    service.list_pending(&principal).map(Json)
}

async fn detail_handler(
    State(service): State<Arc<SellerService>>,
    principal: Principal,
    Path(seller_id): Path<i64>,
) -> Result<Json<SellerView>, WorkflowError> {
    service.get(&principal, SellerId(seller_id)).map(Json)
}

async fn verify_handler(
    State(service): State<Arc<SellerService>>,
    principal: Principal,
    Path(seller_id): Path<i64>,
    Json(request): Json<VerifySellerRequest>,
) -> Result<Json<SellerView>, WorkflowError> {
    service
        .verify(&principal, SellerId(seller_id), request)
        .map(Json)
}
