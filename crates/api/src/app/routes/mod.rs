use axum::{routing::get, Router};

pub mod favorite;
pub mod shopping_cart;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest(
            "/recipes",
            shopping_cart::router().merge(favorite::router()),
        )
}
