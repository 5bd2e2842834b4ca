use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef},
    http::{Request, Response, StatusCode},
    middleware,
    routing::get,
};
use hims_admission::AdmissionService;
use hims_auth::{AuthError, AuthService, AuthState, JwtService};
use hims_storage::{DynStorage, StorageError};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    timeout::{RequestBodyTimeoutLayer, TimeoutLayer},
    trace::TraceLayer,
};

use crate::bootstrap::bootstrap_admin_user;
use crate::config::{AppConfig, AuthSettings, StorageBackend, StorageConfig};
use crate::middleware::{RequestId, request_id};
use crate::{handlers, routes};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub storage: DynStorage,
    pub admissions: AdmissionService,
    pub auth: AuthState,
}

impl AppState {
    pub fn new(storage: DynStorage, settings: &AuthSettings) -> Result<Self, AuthError> {
        let ttl_secs = i64::try_from(settings.token_ttl_secs)
            .map_err(|_| AuthError::configuration("token lifetime is out of range"))?;
        let jwt = JwtService::new(
            settings.jwt_secret.as_bytes(),
            settings.issuer.clone(),
            time::Duration::seconds(ttl_secs),
        )?;
        let auth = AuthService::new(storage.clone(), Arc::new(jwt));
        Ok(Self {
            admissions: AdmissionService::new(storage.clone()),
            auth: AuthState::new(Arc::new(auth)),
            storage,
        })
    }

    pub fn auth_service(&self) -> &AuthService {
        &self.auth.service
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

/// Opens the configured storage backend.
pub async fn create_storage(cfg: &StorageConfig) -> Result<DynStorage, StorageError> {
    match cfg.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Ok(hims_db_memory::create_storage())
        }
        StorageBackend::Postgres => {
            let pg = cfg.postgres.to_backend_config();
            tracing::info!(
                url = %hims_db_postgres::mask_password(&pg.url),
                pool_size = pg.pool_size,
                "Connecting to PostgreSQL"
            );
            hims_db_postgres::create_storage(pg).await
        }
    }
}

pub fn build_app(cfg: &AppConfig, state: AppState) -> Router {
    Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        .nest("/api", routes::api_routes())
        .with_state(state)
        // Middleware stack, innermost first
        .layer(DefaultBodyLimit::max(cfg.server.body_limit_bytes))
        .layer(RequestBodyTimeoutLayer::new(cfg.read_timeout()))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            cfg.write_timeout(),
        ))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request<_>| {
                    let req_id = req
                        .extensions()
                        .get::<RequestId>()
                        .and_then(|id| id.0.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri(),
                        http.status_code = tracing::field::Empty,
                        request_id = %req_id
                    )
                })
                .on_response(
                    |res: &Response<_>, latency: std::time::Duration, span: &tracing::Span| {
                        span.record("http.status_code", res.status().as_u16());
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        // Outermost so the request id is visible to the trace span
        .layer(middleware::from_fn(request_id))
}

pub struct HimsServer {
    addr: SocketAddr,
    app: Router,
}

pub struct ServerBuilder {
    config: AppConfig,
    storage: Option<DynStorage>,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            storage: None,
        }
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.config = cfg;
        self
    }

    /// Uses an already opened backend instead of the configured one.
    pub fn with_storage(mut self, storage: DynStorage) -> Self {
        self.storage = Some(storage);
        self
    }

    pub async fn build(self) -> anyhow::Result<HimsServer> {
        let storage = match self.storage {
            Some(storage) => storage,
            None => create_storage(&self.config.storage).await?,
        };
        let state = AppState::new(storage.clone(), &self.config.auth)?;

        if let Some(ref admin) = self.config.bootstrap.admin_user {
            bootstrap_admin_user(&storage, state.auth_service(), admin).await?;
        }

        tracing::info!(backend = storage.backend_name(), "Storage ready");
        Ok(HimsServer {
            addr: self.config.addr(),
            app: build_app(&self.config, state),
        })
    }
}

impl HimsServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn into_router(self) -> Router {
        self.app
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
