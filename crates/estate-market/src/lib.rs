//! Marketplace backend for property listings.
//!
//! The crate bundles the account, seller onboarding, listing, viewing and
//! favorites workflows together with the adapters and HTTP routes that expose
//! them. `Marketplace` wires everything to the in-process adapters.

pub mod app;
pub mod config;
pub mod error;
pub mod infra;
pub mod telemetry;
pub mod workflows;

pub use app::{Marketplace, MarketplaceAdapters};
