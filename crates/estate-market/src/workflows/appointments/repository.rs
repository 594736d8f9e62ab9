use chrono::{DateTime, Utc};

use super::domain::{Appointment, AppointmentId};
use crate::workflows::error::RepositoryError;
use crate::workflows::identity::UserId;
use crate::workflows::sellers::SellerId;

pub trait AppointmentRepository: Send + Sync {
    /// `Conflict` when the seller already has a pending or confirmed
    /// appointment at exactly the same instant.
    fn insert(&self, appointment: Appointment) -> Result<Appointment, RepositoryError>;
    fn update(&self, appointment: &Appointment) -> Result<(), RepositoryError>;
    fn fetch(&self, id: AppointmentId) -> Result<Option<Appointment>, RepositoryError>;
    fn by_client(&self, client_id: UserId) -> Result<Vec<Appointment>, RepositoryError>;
    fn by_seller(&self, seller_id: SellerId) -> Result<Vec<Appointment>, RepositoryError>;
    fn has_conflict(
        &self,
        seller_id: SellerId,
        appointment_date: DateTime<Utc>,
    ) -> Result<bool, RepositoryError>;
}
