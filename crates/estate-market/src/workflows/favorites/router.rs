use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use super::domain::{FavoriteCheck, FavoriteCount, FavoriteView};
use super::service::FavoriteService;
use crate::workflows::error::WorkflowError;
use crate::workflows::estates::EstateId;
use crate::workflows::identity::Principal;
use crate::workflows::pagination::{Page, PageRequest};

pub fn favorite_router(service: Arc<FavoriteService>) -> Router {
    Router::new()
        .route("/api/favorites", get(list_handler))
        .route("/api/favorites/count", get(count_handler))
        .route("/api/favorites/check/:estate_id", get(check_handler))
        .route(
            "/api/favorites/:estate_id",
            post(add_handler).delete(remove_handler),
        )
        .with_state(service)
}

async fn add_handler(
    State(service): State<Arc<FavoriteService>>,
    principal: Principal,
    Path(estate_id): Path<i64>,
) -> Result<(StatusCode, Json<FavoriteView>), WorkflowError> {
    let view = service.add(&principal, EstateId(estate_id))?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn remove_handler(
    State(service): State<Arc<FavoriteService>>,
    principal: Principal,
    Path(estate_id): Path<i64>,
) -> Result<StatusCode, WorkflowError> {
    service.remove(&principal, EstateId(estate_id))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_handler(
    State(service): State<Arc<FavoriteService>>,
    principal: Principal,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<FavoriteView>>, WorkflowError> {
    service.list(&principal, page).map(Json)
}

async fn check_handler(
    State(service): State<Arc<FavoriteService>>,
    principal: Principal,
    Path(estate_id): Path<i64>,
) -> Result<Json<FavoriteCheck>, WorkflowError> {
    service.is_favorite(&principal, EstateId(estate_id)).map(Json)
}

async fn count_handler(
    State(service): State<Arc<FavoriteService>>,
    principal: Principal,
) -> Result<Json<FavoriteCount>, WorkflowError> {
    service.count(&principal).map(Json)
}
