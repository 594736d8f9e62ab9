use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use std::sync::Arc;

use super::tokens::TokenIssuer;
use crate::workflows::clock::Clock;
use crate::workflows::error::WorkflowError;
use crate::workflows::identity::{Principal, UserId, UserRepository};

/// Resolves bearer tokens into principals.
///
/// The account is reloaded on every request, so role grants and disabled
/// accounts take effect without waiting for the token to expire.
#[derive(Clone)]
pub struct Authenticator {
    tokens: Arc<dyn TokenIssuer>,
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl Authenticator {
    pub fn new(
        tokens: Arc<dyn TokenIssuer>,
        users: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tokens,
            users,
            clock,
        }
    }

    pub fn authenticate(&self, authorization: Option<&str>) -> Result<Principal, WorkflowError> {
        let token = authorization
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| WorkflowError::Unauthorized("Missing bearer token".to_string()))?;

        let claims = self
            .tokens
            .verify_access_token(token, self.clock.now())
            .map_err(|err| WorkflowError::Unauthorized(err.to_string()))?;

        let user = self
            .users
            .fetch(UserId(claims.user_id))?
            .ok_or_else(|| WorkflowError::Unauthorized("Account no longer exists".to_string()))?;
        if !user.enabled {
            return Err(WorkflowError::Unauthorized("Account is disabled".to_string()));
        }

        Ok(Principal::from_user(&user))
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = WorkflowError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let authenticator = parts
            .extensions
            .get::<Authenticator>()
            .cloned()
            .ok_or_else(|| {
                WorkflowError::Unauthorized("Authentication is not configured".to_string())
            })?;

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        authenticator.authenticate(header)
    }
}
