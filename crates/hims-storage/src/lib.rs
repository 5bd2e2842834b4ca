//! # hims-storage
//!
//! Storage abstraction layer for the HIMS server.
//!
//! This crate defines the traits and types that all storage backends must
//! implement. Implementations live in `hims-db-postgres` and `hims-db-memory`.
//!
//! ## Overview
//!
//! - [`PatientStore`], [`StaffStore`], [`BedStore`], [`AdmissionStore`]:
//!   narrow per-entity capabilities.
//! - [`Transaction`]: a scoped unit of work for multi-record changes
//!   (admission creation, bed reassignment, discharge).
//! - [`HospitalStorage`]: a backend exposing all of the above.
//!
//! ## Example
//!
//! ```ignore
//! use hims_storage::{HospitalStorage, StorageError};
//!
//! async fn release(storage: &dyn HospitalStorage, bed: uuid::Uuid) -> Result<bool, StorageError> {
//!     let mut tx = storage.begin_transaction().await?;
//!     let released = tx.release_bed(bed).await?;
//!     tx.commit().await?;
//!     Ok(released)
//! }
//! ```

mod error;
mod traits;
mod types;

pub use error::{ErrorCategory, StorageError};
pub use traits::{
    AdmissionStore, BedStore, HospitalStorage, PatientStore, StaffStore, Transaction,
};
pub use types::{BedFilter, DEFAULT_LIMIT, MAX_LIMIT, Page, PatientFilter, StaffFilter};

/// Type alias for a storage result.
pub type StorageResult<T> = Result<T, StorageError>;

/// Type alias for a shared storage trait object.
pub type DynStorage = std::sync::Arc<dyn HospitalStorage>;
