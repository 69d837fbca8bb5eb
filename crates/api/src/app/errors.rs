use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use toolcrib_infra::engine::EngineError;
use toolcrib_inventory::InstanceStatus;

pub fn engine_error_to_response(err: EngineError) -> axum::response::Response {
    tracing::warn!(error = %err, "request failed");
    match err {
        EngineError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        EngineError::Forbidden(msg) => json_error(StatusCode::FORBIDDEN, "forbidden", msg),
        EngineError::InvalidTransition(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invalid_transition", msg)
        }
        EngineError::InsufficientQuantity {
            requested,
            available,
        } => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "insufficient_quantity",
            format!("requested {requested}, available {available}"),
        ),
        EngineError::Concurrency(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        EngineError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        EngineError::Store(e) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "store_error",
            format!("{e:?}"),
        ),
    }
}

pub fn store_error_to_response(err: toolcrib_infra::store::StoreError) -> axum::response::Response {
    engine_error_to_response(EngineError::from(err))
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

pub fn parse_status(s: &str) -> Result<InstanceStatus, axum::response::Response> {
    s.parse().map_err(|_| {
        json_error(
            StatusCode::BAD_REQUEST,
            "invalid_status",
            "status must be one of: available, assigned_pending, borrowed, \
             transfer_pending, return_pending",
        )
    })
}
