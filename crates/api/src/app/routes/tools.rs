use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};

use toolcrib_core::ToolTypeId;
use toolcrib_infra::queries;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_tool).get(list_tools))
        .route("/pool", get(pool))
        .route("/:id", put(update_tool).delete(delete_tool))
}

pub async fn create_tool(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<crate::context::ActorContext>,
    Json(body): Json<dto::CreateToolRequest>,
) -> axum::response::Response {
    let id = match services
        .catalog()
        .create_tool_type(&actor.actor(), &body.name, body.quantity)
    {
        Ok(id) => id,
        Err(e) => return errors::engine_error_to_response(e),
    };

    (
        StatusCode::CREATED,
        Json(serde_json::json!({ "id": id.to_string() })),
    )
        .into_response()
}

pub async fn list_tools(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let items = match queries::instances_overview(services.store(), services.directory()) {
        Ok(items) => items,
        Err(e) => return errors::store_error_to_response(e),
    };
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn pool(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let items = match queries::available_pool(services.store()) {
        Ok(items) => items,
        Err(e) => return errors::store_error_to_response(e),
    };
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn update_tool(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<crate::context::ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateToolRequest>,
) -> axum::response::Response {
    let id: ToolTypeId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid tool id")
        }
    };

    if let Err(e) =
        services
            .catalog()
            .update_tool_type(&actor.actor(), id, body.name, body.total_quantity)
    {
        return errors::engine_error_to_response(e);
    }

    (
        StatusCode::OK,
        Json(serde_json::json!({ "id": id.to_string() })),
    )
        .into_response()
}

pub async fn delete_tool(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<crate::context::ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ToolTypeId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid tool id")
        }
    };

    if let Err(e) = services.catalog().delete_tool_type(&actor.actor(), id) {
        return errors::engine_error_to_response(e);
    }

    (
        StatusCode::OK,
        Json(serde_json::json!({ "id": id.to_string() })),
    )
        .into_response()
}
