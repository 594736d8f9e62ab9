//! In-process adapters for the workflow collaborator traits.

pub mod hashing;
pub mod mail;
pub mod memory;
pub mod storage;

pub use hashing::BcryptPasswordHasher;
pub use mail::{LogMailer, RecordingMailer};
pub use memory::InMemoryStore;
pub use storage::InMemoryObjectStorage;
