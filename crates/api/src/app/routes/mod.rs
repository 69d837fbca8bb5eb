use axum::{routing::get, Router};

pub mod assignments;
pub mod reports;
pub mod returns;
pub mod system;
pub mod tools;
pub mod transfers;
pub mod users;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/tools", tools::router())
        .nest("/assignments", assignments::router())
        .nest("/transfers", transfers::router())
        .nest("/returns", returns::router())
        .nest("/users", users::router())
        .nest("/reports", reports::router())
}
