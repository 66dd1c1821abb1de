//! Clinic access-control API composition root.

#![forbid(unsafe_code)]

mod access_map;
mod api_config;
mod api_router;
mod api_services;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::sync::Arc;

use axum::Router;
use clinic_application::{PasswordHasher, TokenCodec};
use clinic_core::AppError;
use clinic_infrastructure::{Argon2PasswordHasher, InMemoryStore, JwtTokenCodec};
use tracing::{info, warn};

use crate::access_map::AccessMap;
use crate::api_config::{ApiConfig, StoreBackend, init_tracing};
use crate::api_services::{RepositorySet, bootstrap_access_control, build_app_state};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    if config.migrate_only {
        let database_url = config.database_url.as_deref().ok_or_else(|| {
            AppError::Validation("DATABASE_URL is required to apply migrations".to_owned())
        })?;
        api_services::connect_and_migrate(database_url).await?;
        info!("database migrations applied successfully");
        return Ok(());
    }

    let access_map = AccessMap::standard(config.unmapped_path_policy)?;
    info!(
        routes = access_map.routes().len(),
        unmapped = ?access_map.unmapped_policy(),
        "access map validated"
    );
    let password_hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher::new());
    let token_codec: Arc<dyn TokenCodec> = Arc::new(JwtTokenCodec::new(
        config.token_secret.as_str(),
        chrono::Duration::minutes(config.token_ttl_minutes),
    )?);

    let app = match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config.database_url.as_deref().ok_or_else(|| {
                AppError::Validation("DATABASE_URL is required".to_owned())
            })?;
            let pool = api_services::connect_and_migrate(database_url).await?;
            let state = build_app_state(
                RepositorySet::postgres(&pool),
                password_hasher,
                token_codec,
                access_map,
            );
            bootstrap_access_control(&state, config.bootstrap_admin.as_ref()).await?;

            let session_layer =
                api_services::build_postgres_session_layer(pool, config.cookie_secure).await?;
            api_router::build_router(state, config.frontend_url.as_str(), session_layer)?
        }
        StoreBackend::Memory => {
            warn!("running with the in-memory store; data is lost on restart");
            let state = build_app_state(
                RepositorySet::in_memory(Arc::new(InMemoryStore::new())),
                password_hasher,
                token_codec,
                access_map,
            );
            bootstrap_access_control(&state, config.bootstrap_admin.as_ref()).await?;

            let session_layer = api_services::build_memory_session_layer(config.cookie_secure);
            api_router::build_router(state, config.frontend_url.as_str(), session_layer)?
        }
    };

    serve(app, &config).await
}

async fn serve(app: Router, config: &ApiConfig) -> Result<(), AppError> {
    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "clinic-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
