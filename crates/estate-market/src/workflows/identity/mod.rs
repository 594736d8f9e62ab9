pub mod domain;
pub mod principal;
pub mod repository;

pub use domain::{RoleName, User, UserId, UserProfile, UserView};
pub use principal::Principal;
pub use repository::UserRepository;
