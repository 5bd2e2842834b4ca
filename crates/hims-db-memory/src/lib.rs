//! In-memory storage backend for the HIMS server.
//!
//! This crate provides an in-memory implementation of the `HospitalStorage`
//! trait from `hims-storage`. It is used for tests and for running the server
//! without a database.
//!
//! # Example
//!
//! ```ignore
//! use hims_db_memory::InMemoryStorage;
//! use hims_storage::HospitalStorage;
//!
//! let storage = InMemoryStorage::new();
//! let beds = storage.beds().list(&Default::default(), Default::default()).await?;
//! ```

mod state;
pub mod storage;
pub mod transaction;

pub use hims_storage::{HospitalStorage, StorageError};
pub use storage::{
    InMemoryStorage, MemoryAdmissionStore, MemoryBedStore, MemoryPatientStore, MemoryStaffStore,
};
pub use transaction::MemoryTransaction;

/// Creates a new shareable in-memory storage instance.
pub fn create_storage() -> hims_storage::DynStorage {
    std::sync::Arc::new(InMemoryStorage::new())
}
