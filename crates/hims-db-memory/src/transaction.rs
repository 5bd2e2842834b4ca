//! Transactions for the in-memory backend.

use async_trait::async_trait;
use hims_core::{Admission, AdmissionNumber, Bed, NewAdmission, Patient, PatientStatus};
use hims_storage::{StorageError, Transaction};
use time::OffsetDateTime;
use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

use crate::state::State;

/// Holds the storage lock and a working copy of the tables.
///
/// `commit` swaps the working copy in; dropping discards it.
pub struct MemoryTransaction {
    guard: OwnedMutexGuard<State>,
    working: State,
}

impl MemoryTransaction {
    pub(crate) fn new(guard: OwnedMutexGuard<State>) -> Self {
        let working = guard.clone();
        Self { guard, working }
    }
}

#[async_trait]
impl Transaction for MemoryTransaction {
    async fn commit(self: Box<Self>) -> Result<(), StorageError> {
        let Self { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StorageError> {
        Ok(())
    }

    async fn find_patient(&mut self, id: Uuid) -> Result<Option<Patient>, StorageError> {
        Ok(self.working.patients.get(&id).cloned())
    }

    async fn find_bed(&mut self, id: Uuid) -> Result<Option<Bed>, StorageError> {
        Ok(self.working.beds.get(&id).cloned())
    }

    async fn find_admission(&mut self, id: Uuid) -> Result<Option<Admission>, StorageError> {
        Ok(self.working.admissions.get(&id).cloned())
    }

    async fn has_ongoing_admission(&mut self, patient_id: Uuid) -> Result<bool, StorageError> {
        Ok(self.working.has_ongoing_admission(patient_id))
    }

    async fn highest_admission_number(
        &mut self,
        year: i32,
    ) -> Result<Option<AdmissionNumber>, StorageError> {
        Ok(self.working.highest_admission_number(year))
    }

    async fn insert_admission(
        &mut self,
        admission: &NewAdmission,
    ) -> Result<Admission, StorageError> {
        self.working.insert_admission(admission)
    }

    async fn occupy_bed(&mut self, bed_id: Uuid) -> Result<bool, StorageError> {
        Ok(self.working.occupy_bed(bed_id))
    }

    async fn release_bed(&mut self, bed_id: Uuid) -> Result<bool, StorageError> {
        Ok(self.working.release_bed(bed_id))
    }

    async fn link_bed(&mut self, admission_id: Uuid, bed_id: Uuid) -> Result<bool, StorageError> {
        Ok(self.working.link_bed(admission_id, bed_id))
    }

    async fn close_admission(
        &mut self,
        admission_id: Uuid,
        discharged_at: OffsetDateTime,
    ) -> Result<Option<Admission>, StorageError> {
        Ok(self.working.close_admission(admission_id, discharged_at))
    }

    async fn set_patient_status(
        &mut self,
        patient_id: Uuid,
        status: PatientStatus,
    ) -> Result<bool, StorageError> {
        Ok(self
            .working
            .set_patient_status(patient_id, status, OffsetDateTime::now_utc()))
    }
}
