//! Admission workflow.
//!
//! The service owns no state. Every mutating operation runs in a single
//! storage transaction: preconditions are checked inside it, conditional
//! bed updates close the check-then-write window, and any failure rolls the
//! whole operation back.

use std::sync::Arc;

use hims_core::{Admission, AdmissionNumber, NewAdmission, PatientStatus, Staff, StaffRole};
use hims_storage::{DynStorage, Transaction};
use time::OffsetDateTime;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::error::AdmissionError;
use crate::request::CreateAdmission;

pub type AdmissionResult<T> = Result<T, AdmissionError>;

/// Orchestrates admissions across the patient, staff and bed stores.
#[derive(Clone)]
pub struct AdmissionService {
    storage: DynStorage,
    clock: Arc<dyn Clock>,
}

impl AdmissionService {
    pub fn new(storage: DynStorage) -> Self {
        Self::with_clock(storage, Arc::new(SystemClock))
    }

    pub fn with_clock(storage: DynStorage, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    /// Opens an admission, optionally claiming a bed, and marks the patient
    /// as admitted.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the patient, physician, registering staff or bed does
    ///   not exist.
    /// - `Validation` for role or active-flag failures, blank fields, a past
    ///   expected discharge date or an exhausted number sequence.
    /// - `Conflict` if the bed is not available or the patient already has
    ///   an ongoing admission.
    #[instrument(skip(self, request), fields(
        patient_id = %request.patient_id,
        physician_id = %request.physician_id,
        bed_id = ?request.bed_id,
    ))]
    pub async fn create_admission(&self, request: CreateAdmission) -> AdmissionResult<Admission> {
        let now = self.clock.now();
        request.validate(now.date())?;

        self.require_staff(request.physician_id, StaffRole::Physician)
            .await?;
        self.require_staff(request.registered_by, StaffRole::Registrar)
            .await?;

        let mut tx = self.storage.begin_transaction().await?;
        let result = create_in(tx.as_mut(), &request, now).await;
        let admission = finish(tx, result).await?;

        info!(
            admission_id = %admission.id,
            admission_number = %admission.admission_number,
            "Admission created"
        );
        Ok(admission)
    }

    /// Moves an ongoing admission to another bed, releasing the previous one.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the admission or bed does not exist.
    /// - `Validation` if the admission is discharged.
    /// - `Conflict` if the bed is not available, including the bed the
    ///   admission already holds.
    #[instrument(skip(self))]
    pub async fn assign_bed(&self, admission_id: Uuid, bed_id: Uuid) -> AdmissionResult<Admission> {
        let mut tx = self.storage.begin_transaction().await?;
        let result = assign_in(tx.as_mut(), admission_id, bed_id).await;
        let (admission, released) = finish(tx, result).await?;

        info!(previous_bed = ?released, "Bed assigned");
        Ok(admission)
    }

    /// Discharges an ongoing admission, releasing its bed.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the admission does not exist.
    /// - `Validation` if it is already discharged.
    #[instrument(skip(self))]
    pub async fn close_admission(&self, admission_id: Uuid) -> AdmissionResult<Admission> {
        let now = self.clock.now();
        let mut tx = self.storage.begin_transaction().await?;
        let result = close_in(tx.as_mut(), admission_id, now).await;
        let admission = finish(tx, result).await?;

        info!(bed_id = ?admission.bed_id, "Admission closed");
        Ok(admission)
    }

    pub async fn get_admission(&self, admission_id: Uuid) -> AdmissionResult<Admission> {
        self.storage
            .admissions()
            .find_by_id(admission_id)
            .await?
            .ok_or_else(|| AdmissionError::not_found("admission", admission_id))
    }

    pub async fn list_ongoing(&self) -> AdmissionResult<Vec<Admission>> {
        Ok(self.storage.admissions().list_ongoing().await?)
    }

    /// All admissions of a patient, newest first.
    pub async fn list_for_patient(&self, patient_id: Uuid) -> AdmissionResult<Vec<Admission>> {
        if self.storage.patients().find_by_id(patient_id).await?.is_none() {
            return Err(AdmissionError::not_found("patient", patient_id));
        }
        Ok(self.storage.admissions().list_for_patient(patient_id).await?)
    }

    /// Loads an active staff member holding `role`.
    async fn require_staff(&self, id: Uuid, role: StaffRole) -> AdmissionResult<Staff> {
        let staff = self
            .storage
            .staff()
            .find_by_id(id)
            .await?
            .ok_or_else(|| AdmissionError::not_found("staff", id))?;
        if !staff.has_role(role) {
            debug!(staff_id = %id, role = %staff.role, "Staff role rejected");
            return Err(AdmissionError::validation(format!(
                "staff {} has role {}, expected {role}",
                staff.username, staff.role
            )));
        }
        if !staff.active {
            debug!(staff_id = %id, "Inactive staff rejected");
            return Err(AdmissionError::validation(format!(
                "staff {} is inactive",
                staff.username
            )));
        }
        Ok(staff)
    }
}

impl std::fmt::Debug for AdmissionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionService")
            .field("backend", &self.storage.backend_name())
            .finish_non_exhaustive()
    }
}

/// Commits on success, rolls back on failure and returns the original error.
async fn finish<T>(
    tx: Box<dyn Transaction>,
    result: AdmissionResult<T>,
) -> AdmissionResult<T> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            debug!(error = %err, "Rolling back admission transaction");
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}

/// Next admission number for `year`, holding the generation lock.
async fn next_admission_number(
    tx: &mut dyn Transaction,
    year: i32,
) -> AdmissionResult<AdmissionNumber> {
    let highest = tx.highest_admission_number(year).await?;
    Ok(AdmissionNumber::next(year, highest.as_ref())?)
}

async fn create_in(
    tx: &mut dyn Transaction,
    request: &CreateAdmission,
    now: OffsetDateTime,
) -> AdmissionResult<Admission> {
    let patient = tx
        .find_patient(request.patient_id)
        .await?
        .ok_or_else(|| AdmissionError::not_found("patient", request.patient_id))?;

    if tx.has_ongoing_admission(patient.id).await? {
        return Err(AdmissionError::conflict(format!(
            "patient {} already has an ongoing admission",
            patient.medical_record_number
        )));
    }

    if let Some(bed_id) = request.bed_id {
        let bed = tx
            .find_bed(bed_id)
            .await?
            .ok_or_else(|| AdmissionError::not_found("bed", bed_id))?;
        if !bed.is_available() {
            return Err(AdmissionError::conflict(format!(
                "bed {} is not available ({})",
                bed.number, bed.status
            )));
        }
    }

    let admission_number = next_admission_number(tx, now.year()).await?;
    let admission = tx
        .insert_admission(&NewAdmission {
            id: Uuid::new_v4(),
            admission_number,
            patient_id: patient.id,
            physician_id: request.physician_id,
            registered_by: request.registered_by,
            bed_id: request.bed_id,
            admission_type: request.admission_type,
            reason: request.reason.trim().to_string(),
            entry_diagnosis: request.entry_diagnosis.trim().to_string(),
            admitted_at: now,
            expected_discharge: request.expected_discharge,
            remarks: request.remarks.clone(),
        })
        .await?;

    if let Some(bed_id) = request.bed_id
        && !tx.occupy_bed(bed_id).await?
    {
        return Err(AdmissionError::conflict(format!(
            "bed {bed_id} was claimed concurrently"
        )));
    }

    if !tx
        .set_patient_status(patient.id, PatientStatus::Admitted)
        .await?
    {
        return Err(AdmissionError::not_found("patient", patient.id));
    }

    Ok(admission)
}

/// Returns the updated admission and the bed it released, if any.
async fn assign_in(
    tx: &mut dyn Transaction,
    admission_id: Uuid,
    bed_id: Uuid,
) -> AdmissionResult<(Admission, Option<Uuid>)> {
    let mut admission = tx
        .find_admission(admission_id)
        .await?
        .ok_or_else(|| AdmissionError::not_found("admission", admission_id))?;
    if !admission.is_ongoing() {
        return Err(AdmissionError::validation(format!(
            "admission {} is discharged",
            admission.admission_number
        )));
    }

    let bed = tx
        .find_bed(bed_id)
        .await?
        .ok_or_else(|| AdmissionError::not_found("bed", bed_id))?;
    if !bed.is_available() {
        return Err(AdmissionError::conflict(format!(
            "bed {} is not available ({})",
            bed.number, bed.status
        )));
    }

    let released = admission.bed_id.filter(|previous| *previous != bed_id);
    if let Some(previous) = released
        && !tx.release_bed(previous).await?
    {
        warn!(bed_id = %previous, "Previous bed was not occupied");
    }

    if !tx.occupy_bed(bed_id).await? {
        return Err(AdmissionError::conflict(format!(
            "bed {} was claimed concurrently",
            bed.number
        )));
    }
    if !tx.link_bed(admission_id, bed_id).await? {
        return Err(AdmissionError::validation(format!(
            "admission {} is discharged",
            admission.admission_number
        )));
    }

    admission.bed_id = Some(bed_id);
    Ok((admission, released))
}

async fn close_in(
    tx: &mut dyn Transaction,
    admission_id: Uuid,
    now: OffsetDateTime,
) -> AdmissionResult<Admission> {
    let admission = tx
        .find_admission(admission_id)
        .await?
        .ok_or_else(|| AdmissionError::not_found("admission", admission_id))?;
    if !admission.is_ongoing() {
        return Err(AdmissionError::validation(format!(
            "admission {} is already discharged",
            admission.admission_number
        )));
    }

    let closed = tx
        .close_admission(admission_id, now)
        .await?
        .ok_or_else(|| {
            AdmissionError::validation(format!(
                "admission {} is already discharged",
                admission.admission_number
            ))
        })?;

    if let Some(bed_id) = closed.bed_id
        && !tx.release_bed(bed_id).await?
    {
        warn!(%bed_id, "Bed of closed admission was not occupied");
    }

    if !tx
        .set_patient_status(closed.patient_id, PatientStatus::Discharged)
        .await?
    {
        return Err(AdmissionError::not_found("patient", closed.patient_id));
    }

    Ok(closed)
}
