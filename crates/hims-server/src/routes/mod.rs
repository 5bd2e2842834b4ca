//! `/api` routes.

use axum::Router;

use crate::server::AppState;

mod admissions;
mod auth;
mod beds;
mod patients;
mod staff;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(auth::routes())
        .merge(patients::routes())
        .merge(staff::routes())
        .merge(beds::routes())
        .merge(admissions::routes())
}
