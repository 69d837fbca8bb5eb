use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use toolcrib_auth::UserDirectory;
use toolcrib_core::UserId;
use toolcrib_infra::queries;

use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users))
        .route("/:id/inbox", get(inbox))
        .route("/:id/borrowed", get(borrowed))
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let items = services.directory().list();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn inbox(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: UserId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid user id")
        }
    };

    let items = match queries::inbox_for(services.store(), services.directory(), id) {
        Ok(items) => items,
        Err(e) => return errors::store_error_to_response(e),
    };
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn borrowed(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: UserId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid user id")
        }
    };

    let items = match queries::borrowed_by(services.store(), services.directory(), id) {
        Ok(items) => items,
        Err(e) => return errors::store_error_to_response(e),
    };
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}
