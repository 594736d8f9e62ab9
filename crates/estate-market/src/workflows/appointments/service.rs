use std::cmp::Reverse;
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

use super::domain::{
    Appointment, AppointmentId, AppointmentStatus, AppointmentView, ClientSummary,
    CreateAppointmentRequest, EstateSummary, PendingCount, SellerNotesRequest,
};
use super::repository::AppointmentRepository;
use crate::workflows::clock::Clock;
use crate::workflows::error::{RepositoryError, WorkflowError};
use crate::workflows::estates::{EstateId, EstateRepository, EstateStatus};
use crate::workflows::identity::{Principal, RoleName, UserRepository};
use crate::workflows::pagination::{Page, PageRequest};
use crate::workflows::sellers::{Seller, SellerRepository};

pub struct AppointmentService {
    appointments: Arc<dyn AppointmentRepository>,
    estates: Arc<dyn EstateRepository>,
    sellers: Arc<dyn SellerRepository>,
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl AppointmentService {
    pub fn new(
        appointments: Arc<dyn AppointmentRepository>,
        estates: Arc<dyn EstateRepository>,
        sellers: Arc<dyn SellerRepository>,
        users: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            appointments,
            estates,
            sellers,
            users,
            clock,
        }
    }

    /// Books a viewing with the listing's seller.
    ///
    /// The slot check is repeated by the store on insert, so two concurrent
    /// bookings for the same seller and instant cannot both succeed.
    pub fn create(
        &self,
        principal: &Principal,
        request: CreateAppointmentRequest,
    ) -> Result<AppointmentView, WorkflowError> {
        let now = self.clock.now();
        request.validate_at(now)?;

        let estate_id = EstateId(request.estate_id);
        let estate = self
            .estates
            .fetch(estate_id)?
            .ok_or_else(|| WorkflowError::not_found("Estate", "id", estate_id))?;
        if estate.status != EstateStatus::Approved {
            return Err(WorkflowError::BadRequest(
                "Appointments can only be booked for approved estates".to_string(),
            ));
        }

        if self
            .appointments
            .has_conflict(estate.seller_id, request.appointment_date)?
        {
            warn!(seller_id = %estate.seller_id, date = %request.appointment_date, "appointment slot taken");
            return Err(slot_taken());
        }

        let appointment = Appointment::requested(
            principal.user_id,
            estate.seller_id,
            estate.id,
            &request,
            now,
        );
        let appointment = self
            .appointments
            .insert(appointment)
            .map_err(|err| match err {
                RepositoryError::Conflict(_) => slot_taken(),
                other => other.into(),
            })?;

        info!(
            appointment_id = %appointment.id,
            estate_id = %estate.id,
            seller_id = %estate.seller_id,
            client_id = %principal.user_id,
            "appointment requested"
        );
        self.view(&appointment)
    }

    pub fn cancel(
        &self,
        principal: &Principal,
        id: AppointmentId,
    ) -> Result<AppointmentView, WorkflowError> {
        let mut appointment = self.load(id)?;
        if appointment.client_id != principal.user_id {
            return Err(WorkflowError::forbidden(
                "Only the client who booked the appointment can cancel it",
            ));
        }

        if appointment.cancel(self.clock.now())? {
            self.appointments.update(&appointment)?;
            info!(appointment_id = %appointment.id, "appointment cancelled");
        }
        self.view(&appointment)
    }

    pub fn confirm(
        &self,
        principal: &Principal,
        id: AppointmentId,
        request: SellerNotesRequest,
    ) -> Result<AppointmentView, WorkflowError> {
        request.validate()?;
        self.seller_transition(principal, id, |appointment, now| {
            appointment.confirm(request.notes, now)
        })
    }

    pub fn reject(
        &self,
        principal: &Principal,
        id: AppointmentId,
        request: SellerNotesRequest,
    ) -> Result<AppointmentView, WorkflowError> {
        request.validate()?;
        self.seller_transition(principal, id, |appointment, now| {
            appointment.reject(request.notes, now)
        })
    }

    pub fn complete(
        &self,
        principal: &Principal,
        id: AppointmentId,
    ) -> Result<AppointmentView, WorkflowError> {
        self.seller_transition(principal, id, |appointment, now| appointment.complete(now))
    }

    /// The caller's own requests, latest date first.
    pub fn my_requests(
        &self,
        principal: &Principal,
        page: PageRequest,
    ) -> Result<Page<AppointmentView>, WorkflowError> {
        page.validate()?;
        let mut items = self.appointments.by_client(principal.user_id)?;
        items.sort_by_key(|item| (Reverse(item.appointment_date), Reverse(item.id)));
        page.slice(items).try_map(|item| self.view(&item))
    }

    /// Every appointment with the caller's seller profile, latest date first.
    pub fn my_seller_appointments(
        &self,
        principal: &Principal,
        page: PageRequest,
    ) -> Result<Page<AppointmentView>, WorkflowError> {
        page.validate()?;
        let seller = self.seller_of(principal)?;
        let mut items = self.appointments.by_seller(seller.id)?;
        items.sort_by_key(|item| (Reverse(item.appointment_date), Reverse(item.id)));
        page.slice(items).try_map(|item| self.view(&item))
    }

    /// Requests awaiting the seller's answer, soonest first.
    pub fn pending(
        &self,
        principal: &Principal,
        page: PageRequest,
    ) -> Result<Page<AppointmentView>, WorkflowError> {
        page.validate()?;
        let seller = self.seller_of(principal)?;
        let mut items = self.pending_for(&seller)?;
        items.sort_by_key(|item| (item.appointment_date, item.id));
        page.slice(items).try_map(|item| self.view(&item))
    }

    pub fn pending_count(&self, principal: &Principal) -> Result<PendingCount, WorkflowError> {
        let seller = self.seller_of(principal)?;
        Ok(PendingCount {
            pending: self.pending_for(&seller)?.len(),
        })
    }

    /// The caller's confirmed viewings that have not happened yet, soonest first.
    pub fn upcoming(&self, principal: &Principal) -> Result<Vec<AppointmentView>, WorkflowError> {
        let now = self.clock.now();
        let mut items: Vec<_> = self
            .appointments
            .by_client(principal.user_id)?
            .into_iter()
            .filter(|item| {
                item.status == AppointmentStatus::Confirmed && item.appointment_date >= now
            })
            .collect();
        items.sort_by_key(|item| (item.appointment_date, item.id));
        items.iter().map(|item| self.view(item)).collect()
    }

    fn seller_transition(
        &self,
        principal: &Principal,
        id: AppointmentId,
        apply: impl FnOnce(&mut Appointment, chrono::DateTime<chrono::Utc>) -> Result<(), WorkflowError>,
    ) -> Result<AppointmentView, WorkflowError> {
        let seller = self.seller_of(principal)?;
        let mut appointment = self.load(id)?;
        if appointment.seller_id != seller.id {
            return Err(WorkflowError::forbidden(
                "Only the seller of this appointment can manage it",
            ));
        }

        apply(&mut appointment, self.clock.now())?;
        self.appointments.update(&appointment)?;
        info!(
            appointment_id = %appointment.id,
            seller_id = %seller.id,
            status = appointment.status.label(),
            "appointment updated by seller"
        );
        self.view(&appointment)
    }

    fn pending_for(&self, seller: &Seller) -> Result<Vec<Appointment>, WorkflowError> {
        Ok(self
            .appointments
            .by_seller(seller.id)?
            .into_iter()
            .filter(|item| item.status == AppointmentStatus::Pending)
            .collect())
    }

    fn load(&self, id: AppointmentId) -> Result<Appointment, WorkflowError> {
        self.appointments
            .fetch(id)?
            .ok_or_else(|| WorkflowError::not_found("Appointment", "id", id))
    }

    fn seller_of(&self, principal: &Principal) -> Result<Seller, WorkflowError> {
        principal.require_role(RoleName::Seller)?;
        self.sellers
            .find_by_user(principal.user_id)?
            .ok_or_else(|| WorkflowError::not_found("Seller", "user id", principal.user_id))
    }

    fn view(&self, appointment: &Appointment) -> Result<AppointmentView, WorkflowError> {
        let client = self
            .users
            .fetch(appointment.client_id)?
            .ok_or_else(|| WorkflowError::not_found("User", "id", appointment.client_id))?;
        let estate = self
            .estates
            .fetch(appointment.estate_id)?
            .ok_or_else(|| WorkflowError::not_found("Estate", "id", appointment.estate_id))?;

        Ok(AppointmentView {
            id: appointment.id,
            client: ClientSummary {
                id: client.id,
                name: client.profile.full_name(),
                email: client.email,
                phone: client.profile.contact_number,
            },
            seller_id: appointment.seller_id,
            estate: EstateSummary {
                id: estate.id,
                name: estate.name,
                price: estate.price,
                estate_type: estate.estate_type,
                city: estate.city,
                address: estate.address,
                main_image_url: estate.images.into_iter().next(),
            },
            appointment_date: appointment.appointment_date,
            message: appointment.message.clone(),
            seller_notes: appointment.seller_notes.clone(),
            status: appointment.status,
            created_at: appointment.created_at,
            updated_at: appointment.updated_at,
        })
    }
}

fn slot_taken() -> WorkflowError {
    WorkflowError::Conflict(
        "The seller already has an appointment at this date and time".to_string(),
    )
}
