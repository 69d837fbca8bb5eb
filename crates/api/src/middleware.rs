use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use toolcrib_auth::UserDirectory;
use toolcrib_core::UserId;

use crate::context::ActorContext;

/// Header carrying the caller's user id. Session issuance lives in an
/// external system; this side only resolves the id against the directory.
pub const ACTOR_HEADER: &str = "x-actor-id";

#[derive(Clone)]
pub struct AuthState {
    pub directory: Arc<dyn UserDirectory>,
}

pub async fn identity_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let user_id = extract_actor_id(req.headers())?;

    let record = state
        .directory
        .lookup(user_id)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    req.extensions_mut().insert(ActorContext::new(
        record.user_id,
        record.username,
        record.role,
    ));

    Ok(next.run(req).await)
}

fn extract_actor_id(headers: &HeaderMap) -> Result<UserId, StatusCode> {
    let header = headers.get(ACTOR_HEADER).ok_or(StatusCode::UNAUTHORIZED)?;

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let value = header.trim();
    if value.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    value.parse().map_err(|_| StatusCode::UNAUTHORIZED)
}
