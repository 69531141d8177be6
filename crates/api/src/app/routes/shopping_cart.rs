use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use foodgram_core::RecipeId;
use foodgram_recipes::CartMembership;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::UserContext;

pub const SHOPPING_CART_FILENAME: &str = "shopping_cart.txt";

pub fn router() -> Router {
    Router::new()
        .route("/download_shopping_cart/", get(download_shopping_cart))
        .route("/download_shopping_cart", get(download_shopping_cart))
        .route(
            "/:id/shopping_cart/",
            post(add_to_shopping_cart).delete(remove_from_shopping_cart),
        )
        .route(
            "/:id/shopping_cart",
            post(add_to_shopping_cart).delete(remove_from_shopping_cart),
        )
}

/// The caller's aggregated shopping list as a plain-text attachment.
pub async fn download_shopping_cart(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
) -> axum::response::Response {
    let body = match services.shopping_list.render_shopping_list(user.user_id()).await {
        Ok(body) => body,
        Err(e) => return errors::shopping_list_error_to_response(e),
    };

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={SHOPPING_CART_FILENAME}"),
            ),
        ],
        body,
    )
        .into_response()
}

pub async fn add_to_shopping_cart(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let recipe_id = match parse_recipe_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let membership = CartMembership::new(user.user_id(), recipe_id);

    match services.store.add_to_cart(membership).await {
        Ok(()) => (
            StatusCode::CREATED,
            Json(dto::MembershipResponse::from(membership)),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e, "already_in_cart"),
    }
}

pub async fn remove_from_shopping_cart(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let recipe_id = match parse_recipe_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services
        .store
        .remove_from_cart(CartMembership::new(user.user_id(), recipe_id))
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e, "already_in_cart"),
    }
}

pub(crate) fn parse_recipe_id(raw: &str) -> Result<RecipeId, axum::response::Response> {
    raw.parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid recipe id"))
}
