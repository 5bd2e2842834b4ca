use axum::{
    Router,
    extract::State,
    routing::{get, post, put},
};
use hims_admission::CreateAdmission;
use hims_api::{ApiJson, ApiPath, ApiResponse, ApiResult};
use hims_auth::{BearerAuth, require_role};
use hims_core::time::iso_date;
use hims_core::{Admission, AdmissionType, StaffRole};
use serde::Deserialize;
use time::Date;
use uuid::Uuid;

use crate::server::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admissions", get(list_ongoing).post(create_admission))
        .route("/admissions/{id}", get(get_admission))
        .route("/admissions/{id}/bed", put(assign_bed))
        .route("/admissions/{id}/close", post(close_admission))
}

/// Admission request body. The registering staff is the caller.
#[derive(Debug, Deserialize)]
pub struct CreateAdmissionRequest {
    pub patient_id: Uuid,
    pub physician_id: Uuid,
    pub admission_type: AdmissionType,
    pub reason: String,
    pub entry_diagnosis: String,
    #[serde(default)]
    pub bed_id: Option<Uuid>,
    #[serde(default, with = "iso_date::option")]
    pub expected_discharge: Option<Date>,
    #[serde(default)]
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssignBedRequest {
    pub bed_id: Uuid,
}

async fn list_ongoing(
    State(state): State<AppState>,
    BearerAuth(_staff): BearerAuth,
) -> ApiResult<ApiResponse<Vec<Admission>>> {
    Ok(ApiResponse::ok(state.admissions.list_ongoing().await?))
}

async fn create_admission(
    State(state): State<AppState>,
    BearerAuth(staff): BearerAuth,
    ApiJson(body): ApiJson<CreateAdmissionRequest>,
) -> ApiResult<ApiResponse<Admission>> {
    require_role(&staff, &[StaffRole::Registrar])?;
    let admission = state
        .admissions
        .create_admission(CreateAdmission {
            patient_id: body.patient_id,
            physician_id: body.physician_id,
            registered_by: staff.id,
            admission_type: body.admission_type,
            reason: body.reason,
            entry_diagnosis: body.entry_diagnosis,
            bed_id: body.bed_id,
            expected_discharge: body.expected_discharge,
            remarks: body.remarks,
        })
        .await?;
    Ok(ApiResponse::created(admission).with_message("Admission created"))
}

async fn get_admission(
    State(state): State<AppState>,
    BearerAuth(_staff): BearerAuth,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<Admission>> {
    Ok(ApiResponse::ok(state.admissions.get_admission(id).await?))
}

async fn assign_bed(
    State(state): State<AppState>,
    BearerAuth(staff): BearerAuth,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<AssignBedRequest>,
) -> ApiResult<ApiResponse<Admission>> {
    require_role(
        &staff,
        &[
            StaffRole::Registrar,
            StaffRole::Physician,
            StaffRole::Nurse,
            StaffRole::Admin,
        ],
    )?;
    let admission = state.admissions.assign_bed(id, body.bed_id).await?;
    Ok(ApiResponse::ok(admission).with_message("Bed assigned"))
}

async fn close_admission(
    State(state): State<AppState>,
    BearerAuth(staff): BearerAuth,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<Admission>> {
    require_role(
        &staff,
        &[StaffRole::Physician, StaffRole::Registrar, StaffRole::Admin],
    )?;
    let admission = state.admissions.close_admission(id).await?;
    Ok(ApiResponse::ok(admission).with_message("Patient discharged"))
}
