use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use toolcrib_auth::require_admin;
use toolcrib_infra::queries::{self, AuditQuery};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/audit", get(audit))
}

pub async fn audit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<crate::context::ActorContext>,
    Query(params): Query<dto::AuditReportParams>,
) -> axum::response::Response {
    if let Err(e) = require_admin(&actor.actor()) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let status = match params.status.as_deref() {
        Some(raw) => match errors::parse_status(raw) {
            Ok(s) => Some(s),
            Err(resp) => return resp,
        },
        None => None,
    };

    let query = AuditQuery {
        tool_name: params.tool_name,
        status,
        username: params.username,
    };

    let items = match queries::audit_report(services.store(), services.directory(), &query) {
        Ok(items) => items,
        Err(e) => return errors::store_error_to_response(e),
    };
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}
