use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};

use super::domain::{
    AppointmentId, AppointmentView, CreateAppointmentRequest, PendingCount, SellerNotesRequest,
};
use super::service::AppointmentService;
use crate::workflows::error::WorkflowError;
use crate::workflows::identity::Principal;
use crate::workflows::pagination::{Page, PageRequest};

pub fn appointment_router(service: Arc<AppointmentService>) -> Router {
    Router::new()
        .route("/api/appointments", post(create_handler))
        .route("/api/appointments/my-requests", get(my_requests_handler))
        .route("/api/appointments/upcoming", get(upcoming_handler))
        .route("/api/appointments/my-appointments", get(seller_handler))
        .route("/api/appointments/pending", get(pending_handler))
        .route("/api/appointments/pending/count", get(pending_count_handler))
        .route("/api/appointments/:appointment_id/cancel", patch(cancel_handler))
        .route("/api/appointments/:appointment_id/confirm", patch(confirm_handler))
        .route("/api/appointments/:appointment_id/reject", patch(reject_handler))
        .route("/api/appointments/:appointment_id/complete", patch(complete_handler))
        .with_state(service)
}

async fn create_handler(
    State(service): State<Arc<AppointmentService>>,
    principal: Principal,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<AppointmentView>), WorkflowError> {
    let view = service.create(&principal, request)?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn my_requests_handler(
    State(service): State<Arc<AppointmentService>>,
    principal: Principal,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<AppointmentView>>, WorkflowError> {
    service.my_requests(&principal, page).map(Json)
}

async fn upcoming_handler(
    State(service): State<Arc<AppointmentService>>,
    principal: Principal,
) -> Result<Json<Vec<AppointmentView>>, WorkflowError> {
    service.upcoming(&principal).map(Json)
}

async fn seller_handler(
    State(service): State<Arc<AppointmentService>>,
    principal: Principal,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<AppointmentView>>, WorkflowError> {
    service.my_seller_appointments(&principal, page).map(Json)
}

async fn pending_handler(
    State(service): State<Arc<AppointmentService>>,
    principal: Principal,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<AppointmentView>>, WorkflowError> {
    service.pending(&principal, page).map(Json)
}

async fn pending_count_handler(
    State(service): State<Arc<AppointmentService>>,
    principal: Principal,
) -> Result<Json<PendingCount>, WorkflowError> {
    service.pending_count(&principal).map(Json)
}

async fn cancel_handler(
    State(service): State<Arc<AppointmentService>>,
    principal: Principal,
    Path(appointment_id): Path<i64>,
) -> Result<Json<AppointmentView>, WorkflowError> {
    service
        .cancel(&principal, AppointmentId(appointment_id))
        .map(Json)
}

async fn confirm_handler(
    State(service): State<Arc<AppointmentService>>,
    principal: Principal,
    Path(appointment_id): Path<i64>,
    request: Option<Json<SellerNotesRequest>>,
) -> Result<Json<AppointmentView>, WorkflowError> {
    let request = request.map(|Json(body)| body).unwrap_or_default();
    service
        .confirm(&principal, AppointmentId(appointment_id), request)
        .map(Json)
}

async fn reject_handler(
    State(service): State<Arc<AppointmentService>>,
    principal: Principal,
    Path(appointment_id): Path<i64>,
    request: Option<Json<SellerNotesRequest>>,
) -> Result<Json<AppointmentView>, WorkflowError> {
    let request = request.map(|Json(body)| body).unwrap_or_default();
    service
        .reject(&principal, AppointmentId(appointment_id), request)
        .map(Json)
}

async fn complete_handler(
    State(service): State<Arc<AppointmentService>>,
    principal: Principal,
    Path(appointment_id): Path<i64>,
) -> Result<Json<AppointmentView>, WorkflowError> {
    service
        .complete(&principal, AppointmentId(appointment_id))
        .map(Json)
}
