use axum::{
    Router,
    extract::State,
    routing::{get, patch},
};
use hims_api::{ApiError, ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult};
use hims_auth::{BearerAuth, require_role};
use hims_core::{Bed, BedStatus, NewBed, StaffRole, now_utc};
use hims_storage::{BedFilter, Page};
use serde::Deserialize;
use uuid::Uuid;

use crate::server::AppState;

const ADMIN: &[StaffRole] = &[StaffRole::Admin];

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/beds", get(list_beds).post(create_bed))
        .route("/beds/{id}", get(get_bed))
        .route("/beds/{id}/status", patch(set_bed_status))
        .route("/beds/{id}/active", patch(set_bed_active))
}

#[derive(Debug, Deserialize)]
pub struct BedQuery {
    pub service: Option<String>,
    pub status: Option<BedStatus>,
    #[serde(default)]
    pub available_only: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: BedStatus,
}

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub active: bool,
}

async fn list_beds(
    State(state): State<AppState>,
    BearerAuth(_staff): BearerAuth,
    ApiQuery(query): ApiQuery<BedQuery>,
) -> ApiResult<ApiResponse<Vec<Bed>>> {
    let filter = BedFilter {
        service: query.service,
        status: query.status,
        available_only: query.available_only,
    };
    let beds = state
        .storage
        .beds()
        .list(&filter, Page::new(query.limit, query.offset))
        .await?;
    Ok(ApiResponse::ok(beds))
}

async fn create_bed(
    State(state): State<AppState>,
    BearerAuth(staff): BearerAuth,
    ApiJson(body): ApiJson<NewBed>,
) -> ApiResult<ApiResponse<Bed>> {
    require_role(&staff, ADMIN)?;
    body.validate()?;
    let bed = state
        .storage
        .beds()
        .create(&body.into_bed(Uuid::new_v4(), now_utc()))
        .await?;
    tracing::info!(bed_id = %bed.id, number = %bed.number, "Bed created");
    Ok(ApiResponse::created(bed).with_message("Bed created"))
}

async fn get_bed(
    State(state): State<AppState>,
    BearerAuth(_staff): BearerAuth,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<Bed>> {
    let bed = state
        .storage
        .beds()
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("bed not found: {id}")))?;
    Ok(ApiResponse::ok(bed))
}

/// Ward management status change. `occupied` belongs to the admission
/// workflow and is refused here.
async fn set_bed_status(
    State(state): State<AppState>,
    BearerAuth(staff): BearerAuth,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<SetStatusRequest>,
) -> ApiResult<ApiResponse<Bed>> {
    require_role(&staff, ADMIN)?;
    if !body.status.is_administrative() {
        return Err(ApiError::bad_request(format!(
            "status {} is managed by admissions",
            body.status
        )));
    }
    let bed = state
        .storage
        .beds()
        .set_status(id, body.status)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("bed not found: {id}")))?;
    tracing::info!(bed_id = %id, status = %bed.status, "Bed status changed");
    Ok(ApiResponse::ok(bed))
}

async fn set_bed_active(
    State(state): State<AppState>,
    BearerAuth(staff): BearerAuth,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<SetActiveRequest>,
) -> ApiResult<ApiResponse<Bed>> {
    require_role(&staff, ADMIN)?;
    let bed = state
        .storage
        .beds()
        .set_active(id, body.active)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("bed not found: {id}")))?;
    tracing::info!(bed_id = %id, active = bed.active, "Bed activation changed");
    Ok(ApiResponse::ok(bed))
}
