use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};

use toolcrib_core::{ToolInstanceId, UserId};
use toolcrib_infra::queries;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_transfer))
        .route("/pending", get(pending_transfers))
        .route("/:id/confirm", put(confirm_transfer))
        .route("/:id/reject", put(reject_transfer))
}

pub async fn create_transfer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<crate::context::ActorContext>,
    Json(body): Json<dto::TransferRequest>,
) -> axum::response::Response {
    let instance_id: ToolInstanceId = match body.instance_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid instance id")
        }
    };
    let to_user: UserId = match body.to_user_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid user id")
        }
    };

    match services
        .engine()
        .request_transfer(&actor.actor(), instance_id, to_user)
    {
        Ok(id) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "instance_id": id.to_string() })),
        )
            .into_response(),
        Err(e) => errors::engine_error_to_response(e),
    }
}

pub async fn pending_transfers(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let items = match queries::pending_transfers(services.store(), services.directory()) {
        Ok(items) => items,
        Err(e) => return errors::store_error_to_response(e),
    };
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn confirm_transfer(
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

    match services.engine().confirm_transfer(&actor.actor(), id) {
        Ok(id) => (
            StatusCode::OK,
            Json(serde_json::json!({ "instance_id": id.to_string() })),
        )
            .into_response(),
        Err(e) => errors::engine_error_to_response(e),
    }
}

pub async fn reject_transfer(
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

    match services.engine().reject_transfer(&actor.actor(), id) {
        Ok(id) => (
            StatusCode::OK,
            Json(serde_json::json!({ "instance_id": id.to_string() })),
        )
            .into_response(),
        Err(e) => errors::engine_error_to_response(e),
    }
}
