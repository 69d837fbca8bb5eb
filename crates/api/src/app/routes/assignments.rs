use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{post, put},
    Json, Router,
};

use toolcrib_core::{Quantity, ToolInstanceId, ToolTypeId, UserId};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_assignment))
        .route("/:id/confirm", put(confirm_assignment))
        .route("/:id/reject", put(reject_assignment))
}

pub async fn create_assignment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<crate::context::ActorContext>,
    Json(body): Json<dto::AssignRequest>,
) -> axum::response::Response {
    let tool_type_id: ToolTypeId = match body.tool_type_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid tool type id")
        }
    };
    let user_id: UserId = match body.user_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid user id")
        }
    };
    let quantity = match Quantity::new(body.quantity) {
        Ok(q) => q,
        Err(e) => return errors::engine_error_to_response(e.into()),
    };

    let instance_id = match services
        .engine()
        .assign(&actor.actor(), tool_type_id, user_id, quantity)
    {
        Ok(id) => id,
        Err(e) => return errors::engine_error_to_response(e),
    };

    (
        StatusCode::CREATED,
        Json(serde_json::json!({ "instance_id": instance_id.to_string() })),
    )
        .into_response()
}

pub async fn confirm_assignment(
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

    match services.engine().confirm_assignment(&actor.actor(), id) {
        Ok(id) => (
            StatusCode::OK,
            Json(serde_json::json!({ "instance_id": id.to_string() })),
        )
            .into_response(),
        Err(e) => errors::engine_error_to_response(e),
    }
}

pub async fn reject_assignment(
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

    match services.engine().reject_assignment(&actor.actor(), id) {
        Ok(id) => (
            StatusCode::OK,
            Json(serde_json::json!({ "instance_id": id.to_string() })),
        )
            .into_response(),
        Err(e) => errors::engine_error_to_response(e),
    }
}
