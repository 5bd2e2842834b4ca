use axum::{
    Router,
    extract::State,
    routing::get,
};
use hims_api::{ApiError, ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult};
use hims_auth::{BearerAuth, require_role};
use hims_core::{Admission, NewPatient, Patient, PatientStatus, StaffRole, now_utc};
use hims_storage::{Page, PatientFilter};
use serde::Deserialize;
use uuid::Uuid;

use crate::server::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/patients", get(list_patients).post(register_patient))
        .route("/patients/{id}", get(get_patient))
        .route("/patients/{id}/admissions", get(patient_admissions))
}

#[derive(Debug, Deserialize)]
pub struct PatientQuery {
    pub status: Option<PatientStatus>,
    pub name: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

async fn list_patients(
    State(state): State<AppState>,
    BearerAuth(_staff): BearerAuth,
    ApiQuery(query): ApiQuery<PatientQuery>,
) -> ApiResult<ApiResponse<Vec<Patient>>> {
    let filter = PatientFilter {
        status: query.status,
        name: query.name,
    };
    let patients = state
        .storage
        .patients()
        .list(&filter, Page::new(query.limit, query.offset))
        .await?;
    Ok(ApiResponse::ok(patients))
}

async fn register_patient(
    State(state): State<AppState>,
    BearerAuth(staff): BearerAuth,
    ApiJson(body): ApiJson<NewPatient>,
) -> ApiResult<ApiResponse<Patient>> {
    require_role(&staff, &[StaffRole::Registrar, StaffRole::Admin])?;

    let now = now_utc();
    body.validate(now.date())?;
    let patient = state
        .storage
        .patients()
        .create(&body.into_patient(Uuid::new_v4(), now))
        .await?;

    tracing::info!(
        patient_id = %patient.id,
        mrn = %patient.medical_record_number,
        registered_by = %staff.id,
        "Patient registered"
    );
    Ok(ApiResponse::created(patient).with_message("Patient registered"))
}

async fn get_patient(
    State(state): State<AppState>,
    BearerAuth(_staff): BearerAuth,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<Patient>> {
    let patient = state
        .storage
        .patients()
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("patient not found: {id}")))?;
    Ok(ApiResponse::ok(patient))
}

async fn patient_admissions(
    State(state): State<AppState>,
    BearerAuth(_staff): BearerAuth,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<Vec<Admission>>> {
    let admissions = state.admissions.list_for_patient(id).await?;
    Ok(ApiResponse::ok(admissions))
}
