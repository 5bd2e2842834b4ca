pub mod bootstrap;
pub mod config;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod routes;
pub mod server;

pub use bootstrap::{AdminBootstrap, bootstrap_admin_user};
pub use config::{AppConfig, AuthSettings, PostgresStorageConfig, ServerConfig, StorageBackend};
pub use observability::init_tracing;
pub use server::{AppState, HimsServer, ServerBuilder, build_app, create_storage};
