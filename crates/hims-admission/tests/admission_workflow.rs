//! Admission workflow behavior against the in-memory backend.

use std::sync::Arc;

use hims_admission::{AdmissionError, AdmissionService, CreateAdmission, FixedClock};
use hims_core::{
    AdmissionStatus, AdmissionType, BedStatus, NewBed, NewPatient, NewStaff, PatientStatus, Sex,
    StaffRole,
};
use hims_db_memory::InMemoryStorage;
use hims_storage::DynStorage;
use time::OffsetDateTime;
use time::macros::{date, datetime};
use uuid::Uuid;

const NOW: OffsetDateTime = datetime!(2026-03-01 09:30 UTC);

struct Ward {
    storage: DynStorage,
    service: AdmissionService,
    physician: Uuid,
    registrar: Uuid,
}

impl Ward {
    async fn new() -> Self {
        Self::at(Arc::new(InMemoryStorage::new()), NOW).await
    }

    async fn at(storage: DynStorage, now: OffsetDateTime) -> Self {
        let physician = add_staff(&storage, "dr.grey", StaffRole::Physician).await;
        let registrar = add_staff(&storage, "front.desk", StaffRole::Registrar).await;
        Self {
            service: AdmissionService::with_clock(storage.clone(), Arc::new(FixedClock(now))),
            storage,
            physician,
            registrar,
        }
    }

    async fn patient(&self) -> Uuid {
        let patient = NewPatient {
            medical_record_number: None,
            first_name: "Meredith".into(),
            last_name: "Lee".into(),
            date_of_birth: date!(1985 - 06 - 15),
            sex: Sex::Female,
            phone: None,
            address: None,
            blood_group: None,
            allergies: None,
            medical_history: None,
        }
        .into_patient(Uuid::new_v4(), NOW);
        self.storage.patients().create(&patient).await.unwrap().id
    }

    async fn bed(&self, number: &str) -> Uuid {
        let bed = NewBed {
            number: number.into(),
            floor: 3,
            room: "301".into(),
            service: "surgery".into(),
        }
        .into_bed(Uuid::new_v4(), NOW);
        self.storage.beds().create(&bed).await.unwrap().id
    }

    fn request(&self, patient_id: Uuid, bed_id: Option<Uuid>) -> CreateAdmission {
        CreateAdmission {
            patient_id,
            physician_id: self.physician,
            registered_by: self.registrar,
            admission_type: AdmissionType::Scheduled,
            reason: "Elective surgery".into(),
            entry_diagnosis: "Cholelithiasis".into(),
            bed_id,
            expected_discharge: Some(date!(2026 - 03 - 05)),
            remarks: None,
        }
    }

    async fn bed_status(&self, id: Uuid) -> BedStatus {
        self.storage
            .beds()
            .find_by_id(id)
            .await
            .unwrap()
            .unwrap()
            .status
    }

    async fn patient_status(&self, id: Uuid) -> PatientStatus {
        self.storage
            .patients()
            .find_by_id(id)
            .await
            .unwrap()
            .unwrap()
            .status
    }
}

async fn add_staff(storage: &DynStorage, username: &str, role: StaffRole) -> Uuid {
    let credentials = NewStaff {
        username: username.into(),
        display_name: username.into(),
        email: None,
        role,
        password_hash: "unused".into(),
    }
    .into_credentials(Uuid::new_v4(), NOW);
    storage.staff().create(&credentials).await.unwrap().id
}

#[tokio::test]
async fn test_create_with_bed_claims_it() {
    let ward = Ward::new().await;
    let patient = ward.patient().await;
    let bed = ward.bed("S-301-A").await;

    let admission = ward
        .service
        .create_admission(ward.request(patient, Some(bed)))
        .await
        .unwrap();

    assert_eq!(admission.bed_id, Some(bed));
    assert_eq!(admission.status, AdmissionStatus::Ongoing);
    assert_eq!(admission.admitted_at, NOW);
    assert_eq!(admission.admission_number.to_string(), "20260001");
    assert_eq!(ward.bed_status(bed).await, BedStatus::Occupied);
    assert_eq!(ward.patient_status(patient).await, PatientStatus::Admitted);
}

#[tokio::test]
async fn test_full_stay_scenario() {
    let ward = Ward::new().await;
    let patient = ward.patient().await;
    let bed = ward.bed("S-301-A").await;

    let admission = ward
        .service
        .create_admission(ward.request(patient, None))
        .await
        .unwrap();
    assert_eq!(ward.patient_status(patient).await, PatientStatus::Admitted);
    assert_eq!(ward.bed_status(bed).await, BedStatus::Available);

    let assigned = ward.service.assign_bed(admission.id, bed).await.unwrap();
    assert_eq!(assigned.bed_id, Some(bed));
    assert_eq!(ward.bed_status(bed).await, BedStatus::Occupied);

    let closed = ward.service.close_admission(admission.id).await.unwrap();
    assert_eq!(closed.status, AdmissionStatus::Discharged);
    assert_eq!(closed.discharged_at, Some(NOW));
    assert_eq!(closed.bed_id, Some(bed));
    assert_eq!(ward.bed_status(bed).await, BedStatus::Available);
    assert_eq!(ward.patient_status(patient).await, PatientStatus::Discharged);
}

#[tokio::test]
async fn test_reassignment_releases_previous_bed() {
    let ward = Ward::new().await;
    let patient = ward.patient().await;
    let first = ward.bed("S-301-A").await;
    let second = ward.bed("S-301-B").await;

    let admission = ward
        .service
        .create_admission(ward.request(patient, Some(first)))
        .await
        .unwrap();
    let moved = ward.service.assign_bed(admission.id, second).await.unwrap();

    assert_eq!(moved.bed_id, Some(second));
    assert_eq!(ward.bed_status(first).await, BedStatus::Available);
    assert_eq!(ward.bed_status(second).await, BedStatus::Occupied);
}

#[tokio::test]
async fn test_assigning_held_bed_is_conflict() {
    let ward = Ward::new().await;
    let patient = ward.patient().await;
    let bed = ward.bed("S-301-A").await;

    let admission = ward
        .service
        .create_admission(ward.request(patient, Some(bed)))
        .await
        .unwrap();
    let err = ward.service.assign_bed(admission.id, bed).await.unwrap_err();

    assert!(err.is_conflict());
    assert_eq!(ward.bed_status(bed).await, BedStatus::Occupied);
    let stored = ward.service.get_admission(admission.id).await.unwrap();
    assert_eq!(stored.bed_id, Some(bed));
}

#[tokio::test]
async fn test_close_twice_fails_second_time() {
    let ward = Ward::new().await;
    let patient = ward.patient().await;
    let bed = ward.bed("S-301-A").await;

    let admission = ward
        .service
        .create_admission(ward.request(patient, Some(bed)))
        .await
        .unwrap();
    ward.service.close_admission(admission.id).await.unwrap();

    // Someone else takes the released bed before the second close
    let other = ward.patient().await;
    ward.service
        .create_admission(ward.request(other, Some(bed)))
        .await
        .unwrap();

    let err = ward.service.close_admission(admission.id).await.unwrap_err();
    assert!(matches!(err, AdmissionError::Validation { .. }));
    assert_eq!(ward.bed_status(bed).await, BedStatus::Occupied);
}

#[tokio::test]
async fn test_unavailable_bed_mutates_nothing() {
    let ward = Ward::new().await;
    let patient = ward.patient().await;
    let bed = ward.bed("S-301-A").await;
    ward.storage
        .beds()
        .set_status(bed, BedStatus::Maintenance)
        .await
        .unwrap();

    let err = ward
        .service
        .create_admission(ward.request(patient, Some(bed)))
        .await
        .unwrap_err();

    assert!(err.is_conflict());
    assert!(err.is_validation());
    assert_eq!(ward.patient_status(patient).await, PatientStatus::Ambulatory);
    assert!(
        ward.service
            .list_for_patient(patient)
            .await
            .unwrap()
            .is_empty()
    );
    assert_eq!(ward.bed_status(bed).await, BedStatus::Maintenance);
}

#[tokio::test]
async fn test_assign_on_discharged_admission_leaves_bed() {
    let ward = Ward::new().await;
    let patient = ward.patient().await;
    let bed = ward.bed("S-301-A").await;

    let admission = ward
        .service
        .create_admission(ward.request(patient, None))
        .await
        .unwrap();
    ward.service.close_admission(admission.id).await.unwrap();

    let err = ward.service.assign_bed(admission.id, bed).await.unwrap_err();
    assert!(matches!(err, AdmissionError::Validation { .. }));
    assert_eq!(ward.bed_status(bed).await, BedStatus::Available);
}

#[tokio::test]
async fn test_numbers_increase_and_reset_each_year() {
    let storage: DynStorage = Arc::new(InMemoryStorage::new());
    let ward = Ward::at(storage.clone(), NOW).await;

    let mut numbers = Vec::new();
    for _ in 0..3 {
        let patient = ward.patient().await;
        let admission = ward
            .service
            .create_admission(ward.request(patient, None))
            .await
            .unwrap();
        numbers.push(admission.admission_number.to_string());
    }
    assert_eq!(numbers, ["20260001", "20260002", "20260003"]);

    let next_year = AdmissionService::with_clock(
        storage,
        Arc::new(FixedClock(datetime!(2027-01-01 00:05 UTC))),
    );
    let patient = ward.patient().await;
    let mut request = ward.request(patient, None);
    request.expected_discharge = None;
    let admission = next_year.create_admission(request).await.unwrap();
    assert_eq!(admission.admission_number.to_string(), "20270001");
}

#[tokio::test]
async fn test_second_ongoing_admission_rejected() {
    let ward = Ward::new().await;
    let patient = ward.patient().await;

    ward.service
        .create_admission(ward.request(patient, None))
        .await
        .unwrap();
    let err = ward
        .service
        .create_admission(ward.request(patient, None))
        .await
        .unwrap_err();

    assert!(err.is_conflict());
    assert_eq!(ward.service.list_ongoing().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_staff_roles_and_activity_enforced() {
    let ward = Ward::new().await;
    let patient = ward.patient().await;

    // Registrar as physician
    let mut request = ward.request(patient, None);
    request.physician_id = ward.registrar;
    let err = ward.service.create_admission(request).await.unwrap_err();
    assert!(matches!(err, AdmissionError::Validation { .. }));

    // Physician as registering staff
    let mut request = ward.request(patient, None);
    request.registered_by = ward.physician;
    let err = ward.service.create_admission(request).await.unwrap_err();
    assert!(matches!(err, AdmissionError::Validation { .. }));

    // Inactive physician
    ward.storage
        .staff()
        .set_active(ward.physician, false)
        .await
        .unwrap();
    let err = ward
        .service
        .create_admission(ward.request(patient, None))
        .await
        .unwrap_err();
    assert!(matches!(err, AdmissionError::Validation { .. }));

    // Unknown staff
    let mut request = ward.request(patient, None);
    request.physician_id = Uuid::new_v4();
    let err = ward.service.create_admission(request).await.unwrap_err();
    assert!(err.is_not_found());

    assert_eq!(ward.patient_status(patient).await, PatientStatus::Ambulatory);
}

#[tokio::test]
async fn test_field_validation() {
    let ward = Ward::new().await;
    let patient = ward.patient().await;

    let mut request = ward.request(patient, None);
    request.expected_discharge = Some(date!(2026 - 02 - 27));
    let err = ward.service.create_admission(request).await.unwrap_err();
    assert!(matches!(err, AdmissionError::Validation { .. }));

    let mut request = ward.request(patient, None);
    request.reason = " ".into();
    let err = ward.service.create_admission(request).await.unwrap_err();
    assert!(matches!(err, AdmissionError::Validation { .. }));
}

#[tokio::test]
async fn test_missing_references_are_not_found() {
    let ward = Ward::new().await;

    let err = ward
        .service
        .create_admission(ward.request(Uuid::new_v4(), None))
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let patient = ward.patient().await;
    let err = ward
        .service
        .create_admission(ward.request(patient, Some(Uuid::new_v4())))
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let err = ward
        .service
        .assign_bed(Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(
        ward.service
            .close_admission(Uuid::new_v4())
            .await
            .unwrap_err()
            .is_not_found()
    );
    assert!(
        ward.service
            .list_for_patient(Uuid::new_v4())
            .await
            .unwrap_err()
            .is_not_found()
    );
}

#[tokio::test]
async fn test_concurrent_claims_on_one_bed() {
    let ward = Ward::new().await;
    let bed = ward.bed("S-301-A").await;
    let first = ward.patient().await;
    let second = ward.patient().await;

    let (a, b) = tokio::join!(
        ward.service.create_admission(ward.request(first, Some(bed))),
        ward.service.create_admission(ward.request(second, Some(bed))),
    );

    assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
    assert!(a.err().or(b.err()).is_some_and(|e| e.is_conflict()));
    assert_eq!(ward.service.list_ongoing().await.unwrap().len(), 1);
}
