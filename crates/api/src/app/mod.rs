//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: storage selection and the shopping-list service
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: response bodies
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use foodgram_infra::{RecipeStore, StoreError};

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router from process configuration (used by `main.rs`).
pub async fn build_app(config: &ApiConfig) -> Result<Router, StoreError> {
    let store = services::connect_store(config.database_url.as_deref()).await?;
    Ok(build_app_with_store(config.jwt_secret.clone(), store))
}

/// Build the router over an already constructed store.
pub fn build_app_with_store(jwt_secret: String, store: Arc<dyn RecipeStore>) -> Router {
    let jwt = Arc::new(foodgram_auth::Hs256JwtValidator::new(jwt_secret.into_bytes()));
    let auth_state = middleware::AuthState { jwt };

    let services = Arc::new(services::AppServices::new(store));

    // Protected routes: require a valid bearer token.
    let protected = routes::router().layer(
        ServiceBuilder::new()
            .layer(Extension(services))
            .layer(axum::middleware::from_fn_with_state(
                auth_state,
                middleware::auth_middleware,
            )),
    );

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
}
