use axum::{
    Router,
    extract::State,
    routing::{get, patch},
};
use hims_api::{ApiError, ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult};
use hims_auth::{BearerAuth, StaffRegistration, require_role};
use hims_core::{Staff, StaffRole};
use hims_storage::{Page, StaffFilter};
use serde::Deserialize;
use uuid::Uuid;

use crate::server::AppState;

const ADMIN: &[StaffRole] = &[StaffRole::Admin];

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/staff", get(list_staff).post(create_staff))
        .route("/staff/{id}", get(get_staff))
        .route("/staff/{id}/active", patch(set_staff_active))
}

#[derive(Debug, Deserialize)]
pub struct StaffQuery {
    pub role: Option<StaffRole>,
    pub active: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateStaffRequest {
    pub username: String,
    pub display_name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub role: StaffRole,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub active: bool,
}

async fn list_staff(
    State(state): State<AppState>,
    BearerAuth(caller): BearerAuth,
    ApiQuery(query): ApiQuery<StaffQuery>,
) -> ApiResult<ApiResponse<Vec<Staff>>> {
    require_role(&caller, ADMIN)?;
    let filter = StaffFilter {
        role: query.role,
        active: query.active,
    };
    let staff = state
        .storage
        .staff()
        .list(&filter, Page::new(query.limit, query.offset))
        .await?;
    Ok(ApiResponse::ok(staff))
}

async fn create_staff(
    State(state): State<AppState>,
    BearerAuth(caller): BearerAuth,
    ApiJson(body): ApiJson<CreateStaffRequest>,
) -> ApiResult<ApiResponse<Staff>> {
    require_role(&caller, ADMIN)?;
    let staff = state
        .auth_service()
        .register_staff(StaffRegistration {
            username: body.username,
            display_name: body.display_name,
            email: body.email,
            role: body.role,
            password: body.password,
        })
        .await?;
    Ok(ApiResponse::created(staff).with_message("Staff account created"))
}

async fn get_staff(
    State(state): State<AppState>,
    BearerAuth(caller): BearerAuth,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<Staff>> {
    require_role(&caller, ADMIN)?;
    let staff = state
        .storage
        .staff()
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("staff not found: {id}")))?;
    Ok(ApiResponse::ok(staff))
}

async fn set_staff_active(
    State(state): State<AppState>,
    BearerAuth(caller): BearerAuth,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<SetActiveRequest>,
) -> ApiResult<ApiResponse<Staff>> {
    require_role(&caller, ADMIN)?;
    if id == caller.id && !body.active {
        return Err(ApiError::bad_request("cannot deactivate your own account"));
    }
    let staff = state
        .storage
        .staff()
        .set_active(id, body.active)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("staff not found: {id}")))?;

    tracing::info!(staff_id = %id, active = body.active, changed_by = %caller.id, "Staff activation changed");
    Ok(ApiResponse::ok(staff))
}
