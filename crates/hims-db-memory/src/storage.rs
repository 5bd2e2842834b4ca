use std::sync::Arc;

use async_trait::async_trait;
use hims_core::{Admission, Bed, BedStatus, Patient, PatientStatus, Staff, StaffCredentials};
use hims_storage::{
    AdmissionStore, BedFilter, BedStore, HospitalStorage, Page, PatientFilter, PatientStore,
    StaffFilter, StaffStore, StorageError, Transaction,
};
use time::OffsetDateTime;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::state::State;
use crate::transaction::MemoryTransaction;

pub(crate) type SharedState = Arc<Mutex<State>>;

/// In-memory hospital storage backend.
///
/// All tables live behind a single async mutex. A transaction holds that
/// mutex for its whole lifetime and works on a private copy of the tables,
/// so concurrent transactions are fully serialized and uncommitted changes
/// are never visible.
#[derive(Debug, Clone)]
pub struct InMemoryStorage {
    patients: MemoryPatientStore,
    staff: MemoryStaffStore,
    beds: MemoryBedStore,
    admissions: MemoryAdmissionStore,
    state: SharedState,
}

impl InMemoryStorage {
    /// Creates an empty storage.
    pub fn new() -> Self {
        let state: SharedState = Arc::new(Mutex::new(State::default()));
        Self {
            patients: MemoryPatientStore {
                state: state.clone(),
            },
            staff: MemoryStaffStore {
                state: state.clone(),
            },
            beds: MemoryBedStore {
                state: state.clone(),
            },
            admissions: MemoryAdmissionStore {
                state: state.clone(),
            },
            state,
        }
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HospitalStorage for InMemoryStorage {
    fn patients(&self) -> &dyn PatientStore {
        &self.patients
    }

    fn staff(&self) -> &dyn StaffStore {
        &self.staff
    }

    fn beds(&self) -> &dyn BedStore {
        &self.beds
    }

    fn admissions(&self) -> &dyn AdmissionStore {
        &self.admissions
    }

    async fn begin_transaction(&self) -> Result<Box<dyn Transaction>, StorageError> {
        let guard = self.state.clone().lock_owned().await;
        Ok(Box::new(MemoryTransaction::new(guard)))
    }

    async fn ping(&self) -> Result<(), StorageError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[derive(Debug, Clone)]
pub struct MemoryPatientStore {
    state: SharedState,
}

#[async_trait]
impl PatientStore for MemoryPatientStore {
    async fn create(&self, patient: &Patient) -> Result<Patient, StorageError> {
        self.state.lock().await.insert_patient(patient)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Patient>, StorageError> {
        Ok(self.state.lock().await.patients.get(&id).cloned())
    }

    async fn list(
        &self,
        filter: &PatientFilter,
        page: Page,
    ) -> Result<Vec<Patient>, StorageError> {
        let state = self.state.lock().await;
        let mut patients: Vec<&Patient> = state
            .patients
            .values()
            .filter(|p| filter.matches(p))
            .collect();
        patients.sort_by(|a, b| {
            (&a.last_name, &a.first_name, a.id).cmp(&(&b.last_name, &b.first_name, b.id))
        });
        Ok(page.apply(patients.into_iter().cloned()))
    }

    async fn set_status(&self, id: Uuid, status: PatientStatus) -> Result<bool, StorageError> {
        Ok(self
            .state
            .lock()
            .await
            .set_patient_status(id, status, OffsetDateTime::now_utc()))
    }
}

#[derive(Debug, Clone)]
pub struct MemoryStaffStore {
    state: SharedState,
}

#[async_trait]
impl StaffStore for MemoryStaffStore {
    async fn create(&self, credentials: &StaffCredentials) -> Result<Staff, StorageError> {
        self.state.lock().await.insert_staff(credentials)?;
        Ok(credentials.staff.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Staff>, StorageError> {
        Ok(self
            .state
            .lock()
            .await
            .staff
            .get(&id)
            .map(|c| c.staff.clone()))
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<StaffCredentials>, StorageError> {
        Ok(self
            .state
            .lock()
            .await
            .staff
            .values()
            .find(|c| c.staff.username == username)
            .cloned())
    }

    async fn list(&self, filter: &StaffFilter, page: Page) -> Result<Vec<Staff>, StorageError> {
        let state = self.state.lock().await;
        let mut staff: Vec<&Staff> = state
            .staff
            .values()
            .map(|c| &c.staff)
            .filter(|s| filter.matches(s))
            .collect();
        staff.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(page.apply(staff.into_iter().cloned()))
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<Option<Staff>, StorageError> {
        let mut state = self.state.lock().await;
        Ok(state.staff.get_mut(&id).map(|c| {
            c.staff.active = active;
            c.staff.clone()
        }))
    }
}

#[derive(Debug, Clone)]
pub struct MemoryBedStore {
    state: SharedState,
}

#[async_trait]
impl BedStore for MemoryBedStore {
    async fn create(&self, bed: &Bed) -> Result<Bed, StorageError> {
        self.state.lock().await.insert_bed(bed)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Bed>, StorageError> {
        Ok(self.state.lock().await.beds.get(&id).cloned())
    }

    async fn list(&self, filter: &BedFilter, page: Page) -> Result<Vec<Bed>, StorageError> {
        let state = self.state.lock().await;
        let mut beds: Vec<&Bed> = state.beds.values().filter(|b| filter.matches(b)).collect();
        beds.sort_by(|a, b| (&a.service, &a.number).cmp(&(&b.service, &b.number)));
        Ok(page.apply(beds.into_iter().cloned()))
    }

    async fn is_available(&self, id: Uuid) -> Result<bool, StorageError> {
        Ok(self
            .state
            .lock()
            .await
            .beds
            .get(&id)
            .is_some_and(Bed::is_available))
    }

    async fn set_status(&self, id: Uuid, status: BedStatus) -> Result<Option<Bed>, StorageError> {
        if !status.is_administrative() {
            return Err(StorageError::invalid_record(
                "beds become occupied only through an admission",
            ));
        }
        self.state
            .lock()
            .await
            .update_idle_bed(id, |bed| bed.status = status)
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<Option<Bed>, StorageError> {
        self.state
            .lock()
            .await
            .update_idle_bed(id, |bed| bed.active = active)
    }
}

#[derive(Debug, Clone)]
pub struct MemoryAdmissionStore {
    state: SharedState,
}

#[async_trait]
impl AdmissionStore for MemoryAdmissionStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Admission>, StorageError> {
        Ok(self.state.lock().await.admissions.get(&id).cloned())
    }

    async fn list_ongoing(&self) -> Result<Vec<Admission>, StorageError> {
        let state = self.state.lock().await;
        let mut ongoing: Vec<Admission> = state
            .admissions
            .values()
            .filter(|a| a.is_ongoing())
            .cloned()
            .collect();
        ongoing.sort_by(|a, b| {
            (a.admitted_at, &a.admission_number).cmp(&(b.admitted_at, &b.admission_number))
        });
        Ok(ongoing)
    }

    async fn list_for_patient(&self, patient_id: Uuid) -> Result<Vec<Admission>, StorageError> {
        let state = self.state.lock().await;
        let mut admissions: Vec<Admission> = state
            .admissions
            .values()
            .filter(|a| a.patient_id == patient_id)
            .cloned()
            .collect();
        admissions.sort_by(|a, b| {
            (b.admitted_at, &b.admission_number).cmp(&(a.admitted_at, &a.admission_number))
        });
        Ok(admissions)
    }
}
