//! Record tables and the constraint checks shared by stores and transactions.

use std::collections::HashMap;

use hims_core::{
    Admission, AdmissionNumber, AdmissionStatus, Bed, BedStatus, NewAdmission, Patient,
    PatientStatus, StaffCredentials,
};
use hims_storage::StorageError;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub(crate) struct State {
    pub(crate) patients: HashMap<Uuid, Patient>,
    pub(crate) staff: HashMap<Uuid, StaffCredentials>,
    pub(crate) beds: HashMap<Uuid, Bed>,
    pub(crate) admissions: HashMap<Uuid, Admission>,
}

impl State {
    pub(crate) fn insert_patient(&mut self, patient: &Patient) -> Result<Patient, StorageError> {
        if self.patients.contains_key(&patient.id) {
            return Err(StorageError::conflict(format!(
                "patient {} already exists",
                patient.id
            )));
        }
        if self
            .patients
            .values()
            .any(|p| p.medical_record_number == patient.medical_record_number)
        {
            return Err(StorageError::conflict(format!(
                "medical record number '{}' is taken",
                patient.medical_record_number
            )));
        }
        self.patients.insert(patient.id, patient.clone());
        Ok(patient.clone())
    }

    pub(crate) fn insert_staff(&mut self, credentials: &StaffCredentials) -> Result<(), StorageError> {
        let staff = &credentials.staff;
        if self
            .staff
            .values()
            .any(|c| c.staff.username == staff.username)
        {
            return Err(StorageError::conflict(format!(
                "username '{}' is taken",
                staff.username
            )));
        }
        self.staff.insert(staff.id, credentials.clone());
        Ok(())
    }

    pub(crate) fn insert_bed(&mut self, bed: &Bed) -> Result<Bed, StorageError> {
        if self.beds.values().any(|b| b.number == bed.number) {
            return Err(StorageError::conflict(format!(
                "bed number '{}' is taken",
                bed.number
            )));
        }
        self.beds.insert(bed.id, bed.clone());
        Ok(bed.clone())
    }

    pub(crate) fn set_patient_status(
        &mut self,
        id: Uuid,
        status: PatientStatus,
        now: OffsetDateTime,
    ) -> bool {
        match self.patients.get_mut(&id) {
            Some(patient) => {
                patient.status = status;
                patient.updated_at = now;
                true
            }
            None => false,
        }
    }

    /// Applies an administrative change to a bed that is not occupied.
    pub(crate) fn update_idle_bed(
        &mut self,
        id: Uuid,
        change: impl FnOnce(&mut Bed),
    ) -> Result<Option<Bed>, StorageError> {
        let Some(bed) = self.beds.get_mut(&id) else {
            return Ok(None);
        };
        if bed.status == BedStatus::Occupied {
            return Err(StorageError::conflict(format!(
                "bed {} is occupied",
                bed.number
            )));
        }
        change(bed);
        Ok(Some(bed.clone()))
    }

    pub(crate) fn has_ongoing_admission(&self, patient_id: Uuid) -> bool {
        self.admissions
            .values()
            .any(|a| a.patient_id == patient_id && a.is_ongoing())
    }

    pub(crate) fn highest_admission_number(&self, year: i32) -> Option<AdmissionNumber> {
        self.admissions
            .values()
            .map(|a| &a.admission_number)
            .filter(|n| n.year() == year)
            .max()
            .cloned()
    }

    pub(crate) fn insert_admission(
        &mut self,
        new: &NewAdmission,
    ) -> Result<Admission, StorageError> {
        if self
            .admissions
            .values()
            .any(|a| a.admission_number == new.admission_number)
        {
            return Err(StorageError::conflict(format!(
                "admission number {} is taken",
                new.admission_number
            )));
        }
        if self.has_ongoing_admission(new.patient_id) {
            return Err(StorageError::conflict(format!(
                "patient {} already has an ongoing admission",
                new.patient_id
            )));
        }
        let admission = new.clone().into_admission();
        self.admissions.insert(admission.id, admission.clone());
        Ok(admission)
    }

    pub(crate) fn occupy_bed(&mut self, id: Uuid) -> bool {
        match self.beds.get_mut(&id) {
            Some(bed) if bed.is_available() => {
                bed.status = BedStatus::Occupied;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn release_bed(&mut self, id: Uuid) -> bool {
        match self.beds.get_mut(&id) {
            Some(bed) if bed.status == BedStatus::Occupied => {
                bed.status = BedStatus::Available;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn link_bed(&mut self, admission_id: Uuid, bed_id: Uuid) -> bool {
        match self.admissions.get_mut(&admission_id) {
            Some(admission) if admission.is_ongoing() => {
                admission.bed_id = Some(bed_id);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn close_admission(
        &mut self,
        admission_id: Uuid,
        at: OffsetDateTime,
    ) -> Option<Admission> {
        match self.admissions.get_mut(&admission_id) {
            Some(admission) if admission.is_ongoing() => {
                admission.status = AdmissionStatus::Discharged;
                admission.discharged_at = Some(at);
                Some(admission.clone())
            }
            _ => None,
        }
    }
}
