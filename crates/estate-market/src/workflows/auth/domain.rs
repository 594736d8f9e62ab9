use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use validator::Validate;

use crate::workflows::identity::{UserId, UserProfile, UserView};
use crate::workflows::validation::not_blank;

/// Opaque long-lived session handle. Never rotated on use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshToken {
    pub token: String,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailVerificationToken {
    pub token: String,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl EmailVerificationToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn is_consumed(&self) -> bool {
        self.verified_at.is_some()
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(
        custom(function = "not_blank"),
        length(max = 100, message = "name must be at most 100 characters")
    )]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 100, message = "middleName must be at most 100 characters"))]
    pub middle_name: Option<String>,
    #[validate(
        custom(function = "not_blank"),
        length(max = 100, message = "lastName must be at most 100 characters")
    )]
    pub last_name: String,
    #[serde(default)]
    #[validate(length(max = 100, message = "secondLastName must be at most 100 characters"))]
    pub second_last_name: Option<String>,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    #[serde(default)]
    #[validate(length(max = 30, message = "contactNumber must be at most 30 characters"))]
    pub contact_number: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

impl RegisterRequest {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            name: self.name.trim().to_string(),
            middle_name: trimmed(self.middle_name.as_deref()),
            last_name: self.last_name.trim().to_string(),
            second_last_name: trimmed(self.second_last_name.as_deref()),
            contact_number: self.contact_number.clone(),
            profile_picture: self.profile_picture.clone(),
        }
    }
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(custom(function = "not_blank"))]
    pub email: String,
    #[validate(custom(function = "not_blank"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResendVerificationRequest {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyEmailQuery {
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserView,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationResponse {
    pub message: String,
    pub user: UserView,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
