use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(
    Extension(actor): Extension<crate::context::ActorContext>,
) -> impl IntoResponse {
    Json(serde_json::json!({
        "user_id": actor.user_id().to_string(),
        "username": actor.username(),
        "role": actor.role().as_str(),
    }))
}
