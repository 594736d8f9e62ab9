use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use super::domain::{
    AuthResponse, LoginRequest, MessageResponse, RefreshRequest, RegisterRequest,
    RegistrationResponse, ResendVerificationRequest, VerifyEmailQuery,
};
use super::service::AuthService;
use crate::workflows::error::WorkflowError;
use crate::workflows::identity::{Principal, UserView};

/// Account endpoints under `/api/auth`.
pub fn auth_router(service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/refresh", post(refresh_handler))
        .route("/api/auth/logout", post(logout_handler))
        .route("/api/auth/me", get(me_handler))
        .route("/api/auth/verify-email", get(verify_email_handler))
        .route(
            "/api/auth/resend-verification",
            post(resend_verification_handler),
        )
        .with_state(service)
}

async fn register_handler(
    State(service): State<Arc<AuthService>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegistrationResponse>), WorkflowError> {
    let response = service.register(request)?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn login_handler(
    State(service): State<Arc<AuthService>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, WorkflowError> {
    service.login(request).map(Json)
}

async fn refresh_handler(
    State(service): State<Arc<AuthService>>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, WorkflowError> {
    service.refresh(&request.refresh_token).map(Json)
}

async fn logout_handler(
    State(service): State<Arc<AuthService>>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<MessageResponse>, WorkflowError> {
    service.logout(&request.refresh_token)?;
    Ok(Json(MessageResponse::new("Logged out successfully")))
}

async fn me_handler(
    State(service): State<Arc<AuthService>>,
    principal: Principal,
) -> Result<Json<UserView>, WorkflowError> {
    service.me(&principal).map(Json)
}

async fn verify_email_handler(
    State(service): State<Arc<AuthService>>,
    Query(query): Query<VerifyEmailQuery>,
) -> Result<Json<MessageResponse>, WorkflowError> {
    service.verify_email(&query.token)?;
    Ok(Json(MessageResponse::new(
        "Email verified successfully. You can now log in.",
    )))
}

async fn resend_verification_handler(
    State(service): State<Arc<AuthService>>,
    Json(request): Json<ResendVerificationRequest>,
) -> Result<Json<MessageResponse>, WorkflowError> {
    service.resend_verification(&request.email)?;
    Ok(Json(MessageResponse::new("Verification email sent")))
}
