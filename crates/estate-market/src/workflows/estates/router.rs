use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Json, Router,
};

use super::categories::CategoryService;
use super::domain::{Category, CategoryRequest, CreateEstateRequest, EstateId, EstateType, EstateView};
use super::search::EstateSearchQuery;
use super::service::EstateService;
use super::storage::{ImageService, PresignRequest, PresignedUrlView};
use crate::workflows::error::WorkflowError;
use crate::workflows::identity::Principal;
use crate::workflows::pagination::{Page, PageRequest};

#[derive(Clone)]
struct EstateRoutes {
    estates: Arc<EstateService>,
    categories: Arc<CategoryService>,
    images: Arc<ImageService>,
}

/// Listing, category and image-upload endpoints.
pub fn estate_router(
    estates: Arc<EstateService>,
    categories: Arc<CategoryService>,
    images: Arc<ImageService>,
) -> Router {
    Router::new()
        .route("/api/estates", post(create_handler))
        .route("/api/estates/public/all", get(all_handler))
        .route("/api/estates/public/sale", get(sale_handler))
        .route("/api/estates/public/rent", get(rent_handler))
        .route("/api/estates/public/search", get(search_handler))
        .route("/api/estates/public/:estate_id", get(public_detail_handler))
        .route("/api/estates/my-estates", get(mine_handler))
        .route("/api/estates/pending", get(pending_handler))
        .route("/api/estates/:estate_id", delete(delete_handler))
        .route("/api/estates/:estate_id/sold", patch(sold_handler))
        .route("/api/estates/:estate_id/rented", patch(rented_handler))
        .route("/api/estates/:estate_id/approve", patch(approve_handler))
        .route("/api/estates/:estate_id/reject", patch(reject_handler))
        .route(
            "/api/categories",
            get(list_categories_handler).post(create_category_handler),
        )
        .route("/api/images/estates/presigned-urls", post(presign_handler))
        .with_state(EstateRoutes {
            estates,
            categories,
            images,
        })
}

async fn create_handler(
    State(routes): State<EstateRoutes>,
    principal: Principal,
    Json(request): Json<CreateEstateRequest>,
) -> Result<(StatusCode, Json<EstateView>), WorkflowError> {
    let view = routes.estates.create(&principal, request)?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn all_handler(
    State(routes): State<EstateRoutes>,
    Query(query): Query<EstateSearchQuery>,
) -> Result<Json<Page<EstateView>>, WorkflowError> {
    routes
        .estates
        .list_approved(query.page_request(), query.sort()?)
        .map(Json)
}

async fn sale_handler(
    State(routes): State<EstateRoutes>,
    Query(query): Query<EstateSearchQuery>,
) -> Result<Json<Page<EstateView>>, WorkflowError> {
    routes
        .estates
        .search_by_type(EstateType::Sale, &query)
        .map(Json)
}

async fn rent_handler(
    State(routes): State<EstateRoutes>,
    Query(query): Query<EstateSearchQuery>,
) -> Result<Json<Page<EstateView>>, WorkflowError> {
    routes
        .estates
        .search_by_type(EstateType::Rent, &query)
        .map(Json)
}

async fn search_handler(
    State(routes): State<EstateRoutes>,
    Query(query): Query<EstateSearchQuery>,
) -> Result<Json<Page<EstateView>>, WorkflowError> {
    routes.estates.search(&query).map(Json)
}

async fn public_detail_handler(
    State(routes): State<EstateRoutes>,
    Path(estate_id): Path<i64>,
) -> Result<Json<EstateView>, WorkflowError> {
    routes.estates.get_public(EstateId(estate_id)).map(Json)
}

async fn mine_handler(
    State(routes): State<EstateRoutes>,
    principal: Principal,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<EstateView>>, WorkflowError> {
    routes.estates.list_mine(&principal, page).map(Json)
}

async fn pending_handler(
    State(routes): State<EstateRoutes>,
    principal: Principal,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<EstateView>>, WorkflowError> {
    routes.estates.list_pending(&principal, page).map(Json)
}

async fn delete_handler(
    State(routes): State<EstateRoutes>,
    principal: Principal,
    Path(estate_id): Path<i64>,
) -> Result<StatusCode, WorkflowError> {
    routes.estates.delete(&principal, EstateId(estate_id))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn sold_handler(
    State(routes): State<EstateRoutes>,
    principal: Principal,
    Path(estate_id): Path<i64>,
) -> Result<Json<EstateView>, WorkflowError> {
    routes.estates.mark_sold(&principal, EstateId(estate_id)).map(Json)
}

async fn rented_handler(
    State(routes): State<EstateRoutes>,
    principal: Principal,
    Path(estate_id): Path<i64>,
) -> Result<Json<EstateView>, WorkflowError> {
    routes
        .estates
        .mark_rented(&principal, EstateId(estate_id))
        .map(Json)
}

async fn approve_handler(
    State(routes): State<EstateRoutes>,
    principal: Principal,
    Path(estate_id): Path<i64>,
) -> Result<Json<EstateView>, WorkflowError> {
    routes.estates.approve(&principal, EstateId(estate_id)).map(Json)
}

async fn reject_handler(
    State(routes): State<EstateRoutes>,
    principal: Principal,
    Path(estate_id): Path<i64>,
) -> Result<Json<EstateView>, WorkflowError> {
    routes.estates.reject(&principal, EstateId(estate_id)).map(Json)
}

async fn list_categories_handler(
    State(routes): State<EstateRoutes>,
) -> Result<Json<Vec<Category>>, WorkflowError> {
    routes.categories.list().map(Json)
}

async fn create_category_handler(
    State(routes): State<EstateRoutes>,
    principal: Principal,
    Json(request): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<Category>), WorkflowError> {
    let category = routes.categories.create(&principal, request)?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn presign_handler(
    State(routes): State<EstateRoutes>,
    principal: Principal,
    Json(request): Json<PresignRequest>,
) -> Result<Json<Vec<PresignedUrlView>>, WorkflowError> {
    routes.images.presigned_urls(&principal, request).map(Json)
}
