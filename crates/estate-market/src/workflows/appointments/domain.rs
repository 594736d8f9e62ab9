use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use crate::workflows::error::WorkflowError;
use crate::workflows::estates::{EstateId, EstateType};
use crate::workflows::identity::UserId;
use crate::workflows::sellers::SellerId;
use crate::workflows::validation::field_errors;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppointmentId(pub i64);

impl AppointmentId {
    pub const UNASSIGNED: AppointmentId = AppointmentId(0);
}

impl fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Rejected,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "PENDING",
            AppointmentStatus::Confirmed => "CONFIRMED",
            AppointmentStatus::Rejected => "REJECTED",
            AppointmentStatus::Cancelled => "CANCELLED",
            AppointmentStatus::Completed => "COMPLETED",
        }
    }

    /// Statuses that hold the seller's time slot.
    pub const fn is_active(self) -> bool {
        matches!(self, AppointmentStatus::Pending | AppointmentStatus::Confirmed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Appointment {
    pub id: AppointmentId,
    pub client_id: UserId,
    pub seller_id: SellerId,
    pub estate_id: EstateId,
    pub appointment_date: DateTime<Utc>,
    pub message: Option<String>,
    pub seller_notes: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn requested(
        client_id: UserId,
        seller_id: SellerId,
        estate_id: EstateId,
        request: &CreateAppointmentRequest,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AppointmentId::UNASSIGNED,
            client_id,
            seller_id,
            estate_id,
            appointment_date: request.appointment_date,
            message: request.message.clone(),
            seller_notes: None,
            status: AppointmentStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Client cancellation. Returns whether anything changed: cancelling a
    /// cancelled or rejected appointment is accepted and leaves it untouched.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<bool, WorkflowError> {
        match self.status {
            AppointmentStatus::Completed => Err(WorkflowError::InvalidStatus(
                "Cannot cancel a completed appointment".to_string(),
            )),
            AppointmentStatus::Cancelled | AppointmentStatus::Rejected => Ok(false),
            AppointmentStatus::Pending | AppointmentStatus::Confirmed => {
                self.status = AppointmentStatus::Cancelled;
                self.updated_at = now;
                Ok(true)
            }
        }
    }

    pub fn confirm(&mut self, notes: Option<String>, now: DateTime<Utc>) -> Result<(), WorkflowError> {
        self.answer(AppointmentStatus::Confirmed, notes, now)
    }

    pub fn reject(&mut self, notes: Option<String>, now: DateTime<Utc>) -> Result<(), WorkflowError> {
        self.answer(AppointmentStatus::Rejected, notes, now)
    }

    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<(), WorkflowError> {
        if self.status != AppointmentStatus::Confirmed {
            return Err(WorkflowError::InvalidStatus(format!(
                "Only confirmed appointments can be completed (current status: {})",
                self.status.label()
            )));
        }
        self.status = AppointmentStatus::Completed;
        self.updated_at = now;
        Ok(())
    }

    fn answer(
        &mut self,
        next: AppointmentStatus,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), WorkflowError> {
        if self.status != AppointmentStatus::Pending {
            return Err(WorkflowError::InvalidStatus(format!(
                "Only pending appointments can be {} (current status: {})",
                next.label().to_lowercase(),
                self.status.label()
            )));
        }
        self.status = next;
        self.seller_notes = notes;
        self.updated_at = now;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    pub estate_id: i64,
    pub appointment_date: DateTime<Utc>,
    #[serde(default)]
    #[validate(length(max = 500, message = "message must be at most 500 characters"))]
    pub message: Option<String>,
}

impl CreateAppointmentRequest {
    /// Derived field rules plus the future-date check against `now`.
    pub fn validate_at(&self, now: DateTime<Utc>) -> Result<(), WorkflowError> {
        let mut errors = field_errors(self);
        if self.appointment_date <= now {
            errors.add("appointmentDate", "appointmentDate must be in the future");
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SellerNotesRequest {
    #[serde(default)]
    #[validate(length(max = 500, message = "notes must be at most 500 characters"))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstateSummary {
    pub id: EstateId,
    pub name: String,
    pub price: Decimal,
    #[serde(rename = "type")]
    pub estate_type: EstateType,
    pub city: String,
    pub address: String,
    pub main_image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentView {
    pub id: AppointmentId,
    pub client: ClientSummary,
    pub seller_id: SellerId,
    pub estate: EstateSummary,
    pub appointment_date: DateTime<Utc>,
    pub message: Option<String>,
    pub seller_notes: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCount {
    pub pending: usize,
}
