use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};

use toolcrib_auth::require_admin;
use toolcrib_core::ToolInstanceId;
use toolcrib_infra::queries;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_return))
        .route("/pending", get(pending_returns))
        .route("/:id/accept", put(accept_return))
        .route("/:id/reject", put(reject_return))
}

pub async fn create_return(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<crate::context::ActorContext>,
    Json(body): Json<dto::ReturnRequest>,
) -> axum::response::Response {
    let instance_id: ToolInstanceId = match body.instance_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid instance id")
        }
    };

    match services.engine().request_return(&actor.actor(), instance_id) {
        Ok(id) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "instance_id": id.to_string() })),
        )
            .into_response(),
        Err(e) => errors::engine_error_to_response(e),
    }
}

pub async fn pending_returns(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<crate::context::ActorContext>,
) -> axum::response::Response {
    if let Err(e) = require_admin(&actor.actor()) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let items = match queries::pending_returns(services.store(), services.directory()) {
        Ok(items) => items,
        Err(e) => return errors::store_error_to_response(e),
    };
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn accept_return(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<crate::context::ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ToolInstanceId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid instance id")
        }
    };

    match services.engine().accept_return(&actor.actor(), id) {
        Ok(id) => (
            StatusCode::OK,
            Json(serde_json::json!({ "instance_id": id.to_string() })),
        )
            .into_response(),
        Err(e) => errors::engine_error_to_response(e),
    }
}

pub async fn reject_return(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<crate::context::ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ToolInstanceId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid instance id")
        }
    };

    match services.engine().reject_return(&actor.actor(), id) {
        Ok(id) => (
            StatusCode::OK,
            Json(serde_json::json!({ "instance_id": id.to_string() })),
        )
            .into_response(),
        Err(e) => errors::engine_error_to_response(e),
    }
}
