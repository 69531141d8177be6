use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use foodgram_infra::{ShoppingListError, StoreError};

/// `conflict_code` names the duplicate for the endpoint at hand
/// (`already_in_cart`, `already_favorite`).
pub fn store_error_to_response(
    err: StoreError,
    conflict_code: &'static str,
) -> axum::response::Response {
    match err {
        StoreError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        StoreError::Conflict(msg) => json_error(StatusCode::BAD_REQUEST, conflict_code, msg),
        StoreError::Unavailable(msg) => {
            tracing::warn!(error = %msg, "storage unavailable");
            json_error(StatusCode::SERVICE_UNAVAILABLE, "storage_unavailable", msg)
        }
        StoreError::Corrupt(msg) => {
            tracing::error!(error = %msg, "corrupt record in storage");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "corrupt_record", msg)
        }
    }
}

pub fn shopping_list_error_to_response(err: ShoppingListError) -> axum::response::Response {
    match err {
        ShoppingListError::DataUnavailable(msg) => json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "aggregation_unavailable",
            msg,
        ),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_statuses() {
        let cases = [
            (StoreError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (StoreError::Conflict("x".into()), StatusCode::BAD_REQUEST),
            (StoreError::Unavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (StoreError::Corrupt("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(store_error_to_response(err, "already_in_cart").status(), status);
        }
    }

    #[test]
    fn unavailable_aggregation_is_503() {
        let res = shopping_list_error_to_response(ShoppingListError::DataUnavailable("down".into()));
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
