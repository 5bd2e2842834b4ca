//! Storage traits for the hospital storage abstraction layer.
//!
//! Each leaf store is a narrow capability: the admission workflow reaches
//! patients, staff and beds only through these traits, and performs every
//! multi-record mutation through a [`Transaction`].

use async_trait::async_trait;
use hims_core::{
    Admission, AdmissionNumber, Bed, BedStatus, NewAdmission, Patient, PatientStatus, Staff,
    StaffCredentials,
};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::StorageError;
use crate::types::{BedFilter, Page, PatientFilter, StaffFilter};

/// Patient record store.
#[async_trait]
pub trait PatientStore: Send + Sync {
    /// Persists a new patient.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the medical record number is taken.
    async fn create(&self, patient: &Patient) -> Result<Patient, StorageError>;

    /// Returns `None` if the patient does not exist.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Patient>, StorageError>;

    /// Lists patients ordered by last name, first name.
    async fn list(&self, filter: &PatientFilter, page: Page)
    -> Result<Vec<Patient>, StorageError>;

    /// Sets the status of a patient outside any transaction.
    ///
    /// Returns `false` if the patient does not exist.
    async fn set_status(&self, id: Uuid, status: PatientStatus) -> Result<bool, StorageError>;
}

/// Staff directory.
#[async_trait]
pub trait StaffStore: Send + Sync {
    /// Persists a new staff account.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the username is taken.
    async fn create(&self, credentials: &StaffCredentials) -> Result<Staff, StorageError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Staff>, StorageError>;

    /// Loads an account with its password hash, for authentication.
    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<StaffCredentials>, StorageError>;

    /// Lists staff ordered by username.
    async fn list(&self, filter: &StaffFilter, page: Page) -> Result<Vec<Staff>, StorageError>;

    /// Activates or deactivates an account. Returns `None` if it does not exist.
    async fn set_active(&self, id: Uuid, active: bool) -> Result<Option<Staff>, StorageError>;
}

/// Bed registry.
#[async_trait]
pub trait BedStore: Send + Sync {
    /// Persists a new bed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the bed number is taken.
    async fn create(&self, bed: &Bed) -> Result<Bed, StorageError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Bed>, StorageError>;

    /// Lists beds ordered by service, then number.
    async fn list(&self, filter: &BedFilter, page: Page) -> Result<Vec<Bed>, StorageError>;

    /// Returns `true` if the bed exists, is active and is `available`.
    async fn is_available(&self, id: Uuid) -> Result<bool, StorageError>;

    /// Sets an administrative status (available, maintenance, reserved).
    ///
    /// Returns `None` if the bed does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidRecord` when asked to set `occupied`, and
    /// `StorageError::Conflict` when the bed is currently occupied.
    async fn set_status(&self, id: Uuid, status: BedStatus) -> Result<Option<Bed>, StorageError>;

    /// Activates or deactivates a bed. Same rules as [`BedStore::set_status`]
    /// for occupied beds.
    async fn set_active(&self, id: Uuid, active: bool) -> Result<Option<Bed>, StorageError>;
}

/// Read side of the admission records.
#[async_trait]
pub trait AdmissionStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Admission>, StorageError>;

    /// All ongoing admissions, oldest first.
    async fn list_ongoing(&self) -> Result<Vec<Admission>, StorageError>;

    /// All admissions of a patient, newest first.
    async fn list_for_patient(&self, patient_id: Uuid) -> Result<Vec<Admission>, StorageError>;
}

/// A unit of work spanning patients, beds and admissions.
///
/// Operations are isolated from other callers until [`Transaction::commit`].
/// Dropping a transaction without committing rolls it back.
///
/// Conditional mutations (`occupy_bed`, `release_bed`, `close_admission`)
/// check and change state in a single step and report whether they applied.
#[async_trait]
pub trait Transaction: Send {
    /// Commits all operations in this transaction.
    async fn commit(self: Box<Self>) -> Result<(), StorageError>;

    /// Rolls back all operations in this transaction.
    async fn rollback(self: Box<Self>) -> Result<(), StorageError>;

    async fn find_patient(&mut self, id: Uuid) -> Result<Option<Patient>, StorageError>;

    async fn find_bed(&mut self, id: Uuid) -> Result<Option<Bed>, StorageError>;

    /// Loads an admission, locking it against concurrent workflow updates
    /// where the backend supports row locks.
    async fn find_admission(&mut self, id: Uuid) -> Result<Option<Admission>, StorageError>;

    async fn has_ongoing_admission(&mut self, patient_id: Uuid) -> Result<bool, StorageError>;

    /// Highest admission number issued in `year`.
    ///
    /// Serializes admission number generation until the transaction ends.
    async fn highest_admission_number(
        &mut self,
        year: i32,
    ) -> Result<Option<AdmissionNumber>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the number is taken or the patient
    /// already has an ongoing admission.
    async fn insert_admission(&mut self, admission: &NewAdmission)
    -> Result<Admission, StorageError>;

    /// `available → occupied`, only if the bed is active and available.
    async fn occupy_bed(&mut self, bed_id: Uuid) -> Result<bool, StorageError>;

    /// `occupied → available`, only if the bed is occupied.
    async fn release_bed(&mut self, bed_id: Uuid) -> Result<bool, StorageError>;

    /// Points an ongoing admission at a bed. Returns `false` if the admission
    /// is missing or no longer ongoing.
    async fn link_bed(&mut self, admission_id: Uuid, bed_id: Uuid) -> Result<bool, StorageError>;

    /// `ongoing → discharged`. Returns `None` if the admission is missing or
    /// already discharged.
    async fn close_admission(
        &mut self,
        admission_id: Uuid,
        discharged_at: OffsetDateTime,
    ) -> Result<Option<Admission>, StorageError>;

    async fn set_patient_status(
        &mut self,
        patient_id: Uuid,
        status: PatientStatus,
    ) -> Result<bool, StorageError>;
}

/// A complete storage backend.
#[async_trait]
pub trait HospitalStorage: Send + Sync {
    fn patients(&self) -> &dyn PatientStore;

    fn staff(&self) -> &dyn StaffStore;

    fn beds(&self) -> &dyn BedStore;

    fn admissions(&self) -> &dyn AdmissionStore;

    /// Begins a new transaction.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::TransactionError` if a transaction cannot be started.
    async fn begin_transaction(&self) -> Result<Box<dyn Transaction>, StorageError>;

    /// Checks that the backend is reachable.
    async fn ping(&self) -> Result<(), StorageError>;

    /// Returns the name of this storage backend for logging/debugging.
    fn backend_name(&self) -> &'static str;
}
