//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: catalog operations over the configured store
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: query DTOs and JSON envelope helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use anyhow::Context;
use axum::{routing::get, Extension, Router};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use storefront_auth::{Hs256JwtValidator, JwtValidator};
use storefront_infra::{CatalogStore, InMemoryCatalogStore, PostgresCatalogStore};

use crate::config::{ApiConfig, StorageConfig};
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router from configuration (used by `main.rs`).
pub async fn build_app(config: &ApiConfig) -> anyhow::Result<Router> {
    let store = build_store(&config.storage).await?;
    let jwt: Arc<dyn JwtValidator> =
        Arc::new(Hs256JwtValidator::new(config.jwt_secret.as_bytes()));

    Ok(build_router(Arc::new(services::AppServices::new(store)), jwt))
}

/// Assemble routes around already-built services.
pub fn build_router(services: Arc<services::AppServices>, jwt: Arc<dyn JwtValidator>) -> Router {
    let auth_state = middleware::AuthState { jwt };

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api/products", routes::products::router(auth_state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(Extension(services)),
        )
}

async fn build_store(storage: &StorageConfig) -> anyhow::Result<Arc<dyn CatalogStore>> {
    match storage {
        StorageConfig::InMemory => {
            tracing::info!("using in-memory catalog store");
            Ok(Arc::new(InMemoryCatalogStore::new()))
        }
        StorageConfig::Postgres {
            database_url,
            max_connections,
        } => {
            let pool = PgPoolOptions::new()
                .max_connections(*max_connections)
                .connect(database_url)
                .await
                .context("failed to connect to Postgres")?;

            let store = PostgresCatalogStore::new(pool);
            store
                .migrate()
                .await
                .context("failed to apply catalog schema")?;

            tracing::info!(max_connections, "using Postgres catalog store");
            Ok(Arc::new(store))
        }
    }
}
