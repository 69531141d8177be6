use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use foodgram_recipes::Favorite;

use crate::app::routes::shopping_cart::parse_recipe_id;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::UserContext;

pub fn router() -> Router {
    Router::new()
        .route("/:id/favorite/", post(add_favorite).delete(remove_favorite))
        .route("/:id/favorite", post(add_favorite).delete(remove_favorite))
}

pub async fn add_favorite(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let recipe_id = match parse_recipe_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let favorite = Favorite::new(user.user_id(), recipe_id);

    match services.store.add_favorite(favorite).await {
        Ok(()) => (StatusCode::CREATED, Json(dto::MembershipResponse::from(favorite))).into_response(),
        Err(e) => errors::store_error_to_response(e, "already_favorite"),
    }
}

pub async fn remove_favorite(
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
        .remove_favorite(Favorite::new(user.user_id(), recipe_id))
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e, "already_favorite"),
    }
}
