pub mod admissions;
pub mod auth;
pub mod beds;
pub mod server;
