use axum::{
    Router,
    extract::State,
    routing::{get, post},
};
use hims_api::{ApiJson, ApiResponse, ApiResult};
use hims_auth::BearerAuth;
use hims_core::Staff;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::server::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    pub staff: Staff,
}

async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> ApiResult<ApiResponse<LoginResponse>> {
    let session = state
        .auth_service()
        .login(&body.username, &body.password)
        .await?;
    Ok(ApiResponse::ok(LoginResponse {
        token: session.token.token,
        token_type: "Bearer",
        expires_at: session.token.expires_at,
        staff: session.staff,
    })
    .with_message("Login successful"))
}

async fn me(BearerAuth(staff): BearerAuth) -> ApiResponse<Staff> {
    ApiResponse::ok(staff)
}
