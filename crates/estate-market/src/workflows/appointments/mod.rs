//! Viewing appointments between clients and sellers.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    Appointment, AppointmentId, AppointmentStatus, AppointmentView, CreateAppointmentRequest,
    SellerNotesRequest,
};
pub use repository::AppointmentRepository;
pub use router::appointment_router;
pub use service::AppointmentService;

#[cfg(test)]
mod tests;
