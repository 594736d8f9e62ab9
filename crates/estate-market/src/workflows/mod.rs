//! Marketplace workflows.
//!
//! Each workflow keeps its entities and state transitions in `domain`, its
//! storage contract in `repository`, the guarded operations in `service` and
//! the HTTP surface in `router`. Shared plumbing (errors, paging, time and
//! request validation) lives alongside.

pub mod appointments;
pub mod auth;
pub mod clock;
pub mod error;
pub mod estates;
pub mod favorites;
pub mod identity;
pub mod pagination;
pub mod sellers;
pub mod validation;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{RepositoryError, WorkflowError};
pub use pagination::{Page, PageRequest};
