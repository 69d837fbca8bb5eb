use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::json;

use toolcrib_auth::{InMemoryUserDirectory, Role, UserRecord};
use toolcrib_core::UserId;

struct TestServer {
    base_url: String,
    admin: UserId,
    ana: UserId,
    bo: UserId,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Build app (same router as prod), but bind to an ephemeral port.
        let directory = Arc::new(InMemoryUserDirectory::new());
        let admin = UserId::new();
        let ana = UserId::new();
        let bo = UserId::new();
        directory.insert(UserRecord::new(admin, "keeper", Role::Admin));
        directory.insert(UserRecord::new(ana, "ana", Role::User));
        directory.insert(UserRecord::new(bo, "bo", Role::User));

        let app = toolcrib_api::app::build_app(directory);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            admin,
            ana,
            bo,
            handle,
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn create_tool(client: &reqwest::Client, srv: &TestServer, name: &str, quantity: u32) -> String {
    let res = client
        .post(format!("{}/api/tools", srv.base_url))
        .header("x-actor-id", srv.admin.to_string())
        .json(&json!({ "name": name, "quantity": quantity }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: serde_json::Value = res.json().await.unwrap();
    created["id"].as_str().unwrap().to_string()
}

async fn assign(
    client: &reqwest::Client,
    srv: &TestServer,
    tool_type_id: &str,
    user: UserId,
    quantity: u32,
) -> String {
    let res = client
        .post(format!("{}/api/assignments", srv.base_url))
        .header("x-actor-id", srv.admin.to_string())
        .json(&json!({
            "tool_type_id": tool_type_id,
            "user_id": user.to_string(),
            "quantity": quantity,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: serde_json::Value = res.json().await.unwrap();
    created["instance_id"].as_str().unwrap().to_string()
}

async fn items(client: &reqwest::Client, srv: &TestServer, as_user: UserId, path: &str) -> Vec<serde_json::Value> {
    let res = client
        .get(format!("{}{}", srv.base_url, path))
        .header("x-actor-id", as_user.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK, "GET {path}");
    let body: serde_json::Value = res.json().await.unwrap();
    body["items"].as_array().unwrap().clone()
}

#[tokio::test]
async fn identity_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // No header at all.
    let res = client
        .get(format!("{}/api/whoami", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Malformed id.
    let res = client
        .get(format!("{}/api/whoami", srv.base_url))
        .header("x-actor-id", "not-a-uuid")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Well-formed id the directory does not know.
    let res = client
        .get(format!("{}/api/whoami", srv.base_url))
        .header("x-actor-id", UserId::new().to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // The liveness probe stays open.
    let res = client
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn whoami_reflects_the_resolved_identity() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/whoami", srv.base_url))
        .header("x-actor-id", srv.ana.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["user_id"].as_str().unwrap(), srv.ana.to_string());
    assert_eq!(body["username"], "ana");
    assert_eq!(body["role"], "user");
}

#[tokio::test]
async fn assignment_lifecycle_over_http() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let drill = create_tool(&client, &srv, "drill", 5).await;
    let instance = assign(&client, &srv, &drill, srv.ana, 2).await;

    // The split leaves 3 in the pool while 2 await ana's confirmation.
    let pool = items(&client, &srv, srv.ana, "/api/tools/pool").await;
    assert_eq!(pool.len(), 1);
    assert_eq!(pool[0]["name"], "drill");
    assert_eq!(pool[0]["available"], 3);
    assert_eq!(pool[0]["total"], 5);

    let inbox = items(&client, &srv, srv.ana, &format!("/api/users/{}/inbox", srv.ana)).await;
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0]["instance_id"].as_str().unwrap(), instance);
    assert_eq!(inbox[0]["status"], "assigned_pending");

    // Not borrowed until confirmed.
    let borrowed = items(&client, &srv, srv.ana, &format!("/api/users/{}/borrowed", srv.ana)).await;
    assert!(borrowed.is_empty());

    let res = client
        .put(format!("{}/api/assignments/{}/confirm", srv.base_url, instance))
        .header("x-actor-id", srv.ana.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let borrowed = items(&client, &srv, srv.ana, &format!("/api/users/{}/borrowed", srv.ana)).await;
    assert_eq!(borrowed.len(), 1);
    assert_eq!(borrowed[0]["quantity"], 2);
    assert_eq!(borrowed[0]["holder"], "ana");

    // Return: request, then the admin settles it.
    let res = client
        .post(format!("{}/api/returns", srv.base_url))
        .header("x-actor-id", srv.ana.to_string())
        .json(&json!({ "instance_id": instance }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let queue = items(&client, &srv, srv.admin, "/api/returns/pending").await;
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0]["holder"], "ana");

    let res = client
        .put(format!("{}/api/returns/{}/accept", srv.base_url, instance))
        .header("x-actor-id", srv.admin.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Stock merged back into one row.
    let pool = items(&client, &srv, srv.ana, "/api/tools/pool").await;
    assert_eq!(pool[0]["available"], 5);
    let overview = items(&client, &srv, srv.admin, "/api/tools").await;
    assert_eq!(overview.len(), 1);
    assert_eq!(overview[0]["status"], "available");
    assert_eq!(overview[0]["quantity"], 5);
}

#[tokio::test]
async fn transfer_settles_between_users() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let saw = create_tool(&client, &srv, "saw", 1).await;
    let instance = assign(&client, &srv, &saw, srv.ana, 1).await;
    let res = client
        .put(format!("{}/api/assignments/{}/confirm", srv.base_url, instance))
        .header("x-actor-id", srv.ana.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .post(format!("{}/api/transfers", srv.base_url))
        .header("x-actor-id", srv.ana.to_string())
        .json(&json!({ "instance_id": instance, "to_user_id": srv.bo.to_string() }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let pending = items(&client, &srv, srv.admin, "/api/transfers/pending").await;
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["holder"], "ana");
    assert_eq!(pending[0]["pending_counterparty"], "bo");

    // Only the offered counterparty can settle.
    let res = client
        .put(format!("{}/api/transfers/{}/confirm", srv.base_url, instance))
        .header("x-actor-id", srv.admin.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .put(format!("{}/api/transfers/{}/confirm", srv.base_url, instance))
        .header("x-actor-id", srv.bo.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let ana_borrowed = items(&client, &srv, srv.ana, &format!("/api/users/{}/borrowed", srv.ana)).await;
    assert!(ana_borrowed.is_empty());
    let bo_borrowed = items(&client, &srv, srv.bo, &format!("/api/users/{}/borrowed", srv.bo)).await;
    assert_eq!(bo_borrowed.len(), 1);
    assert_eq!(bo_borrowed[0]["tool_name"], "saw");
}

#[tokio::test]
async fn role_gate_blocks_non_admin_writes() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/tools", srv.base_url))
        .header("x-actor-id", srv.ana.to_string())
        .json(&json!({ "name": "drill", "quantity": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "forbidden");

    // Queries gated to admins too.
    let res = client
        .get(format!("{}/api/returns/pending", srv.base_url))
        .header("x-actor-id", srv.ana.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .get(format!("{}/api/reports/audit", srv.base_url))
        .header("x-actor-id", srv.ana.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn error_mappings_carry_stable_codes() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let drill = create_tool(&client, &srv, "drill", 5).await;

    // More than the pool holds.
    let res = client
        .post(format!("{}/api/assignments", srv.base_url))
        .header("x-actor-id", srv.admin.to_string())
        .json(&json!({
            "tool_type_id": drill,
            "user_id": srv.ana.to_string(),
            "quantity": 99,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "insufficient_quantity");

    // Zero quantity never reaches the engine.
    let res = client
        .post(format!("{}/api/assignments", srv.base_url))
        .header("x-actor-id", srv.admin.to_string())
        .json(&json!({
            "tool_type_id": drill,
            "user_id": srv.ana.to_string(),
            "quantity": 0,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");

    // Well-formed id for a type that does not exist.
    let res = client
        .post(format!("{}/api/assignments", srv.base_url))
        .header("x-actor-id", srv.admin.to_string())
        .json(&json!({
            "tool_type_id": toolcrib_core::ToolTypeId::new().to_string(),
            "user_id": srv.ana.to_string(),
            "quantity": 1,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "not_found");

    // Malformed id.
    let res = client
        .post(format!("{}/api/assignments", srv.base_url))
        .header("x-actor-id", srv.admin.to_string())
        .json(&json!({
            "tool_type_id": "nope",
            "user_id": srv.ana.to_string(),
            "quantity": 1,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_id");

    // Settling a row twice is an invalid transition.
    let instance = assign(&client, &srv, &drill, srv.ana, 2).await;
    let res = client
        .put(format!("{}/api/assignments/{}/confirm", srv.base_url, instance))
        .header("x-actor-id", srv.ana.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let res = client
        .put(format!("{}/api/assignments/{}/confirm", srv.base_url, instance))
        .header("x-actor-id", srv.ana.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_transition");
}

#[tokio::test]
async fn audit_report_filters_by_tool_and_status() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let drill = create_tool(&client, &srv, "drill", 5).await;
    create_tool(&client, &srv, "saw", 1).await;
    let instance = assign(&client, &srv, &drill, srv.ana, 2).await;
    let res = client
        .put(format!("{}/api/assignments/{}/confirm", srv.base_url, instance))
        .header("x-actor-id", srv.ana.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Unfiltered: both creations plus the assignment and its confirmation.
    let all = items(&client, &srv, srv.admin, "/api/reports/audit").await;
    assert_eq!(all.len(), 4);
    // Newest first.
    assert_eq!(all[0]["action"], "assignment_confirmed");

    let drills = items(&client, &srv, srv.admin, "/api/reports/audit?tool_name=dri").await;
    assert_eq!(drills.len(), 3);
    assert!(drills.iter().all(|v| v["tool_name"] == "drill"));

    let borrowed = items(&client, &srv, srv.admin, "/api/reports/audit?status=borrowed").await;
    assert_eq!(borrowed.len(), 1);
    assert_eq!(borrowed[0]["instance_id"].as_str().unwrap(), instance);

    let by_ana = items(&client, &srv, srv.admin, "/api/reports/audit?username=ana").await;
    assert_eq!(by_ana.len(), 2);

    // Unknown status is rejected up front.
    let res = client
        .get(format!("{}/api/reports/audit?status=lost", srv.base_url))
        .header("x-actor-id", srv.admin.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
