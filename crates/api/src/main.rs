use std::sync::Arc;

use toolcrib_auth::{InMemoryUserDirectory, Role, UserRecord};
use toolcrib_core::UserId;

#[tokio::main]
async fn main() {
    toolcrib_observability::init();

    let directory = Arc::new(InMemoryUserDirectory::new());
    let admin_id = seed_admin(&directory);
    tracing::info!(%admin_id, "seeded administrator");

    let app = toolcrib_api::app::build_app(directory);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {bind_addr}: {e}"));

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}

/// Seed the administrator identity the deployment starts with. User records
/// otherwise come from the external directory; without at least one admin
/// there is no way to create tools or assign them.
fn seed_admin(directory: &InMemoryUserDirectory) -> UserId {
    let admin_id = match std::env::var("SEED_ADMIN_ID") {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|e| panic!("SEED_ADMIN_ID is not a user id: {e}")),
        Err(_) => UserId::new(),
    };
    let admin_name = std::env::var("SEED_ADMIN_NAME").unwrap_or_else(|_| "admin".to_string());

    directory.insert(UserRecord::new(admin_id, admin_name, Role::Admin));
    admin_id
}
