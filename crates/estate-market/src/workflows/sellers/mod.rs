//! Seller onboarding: applications, admin review and the SELLER role grant.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{Seller, SellerApplication, SellerId, SellerStatus, SellerView, VerifySellerRequest};
pub use repository::SellerRepository;
pub use router::seller_router;
pub use service::SellerService;
