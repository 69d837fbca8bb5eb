use serde::Deserialize;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateToolRequest {
    pub name: String,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateToolRequest {
    pub name: Option<String>,
    pub total_quantity: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub tool_type_id: String,
    pub user_id: String,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub instance_id: String,
    pub to_user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ReturnRequest {
    pub instance_id: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct AuditReportParams {
    pub tool_name: Option<String>,
    pub status: Option<String>,
    pub username: Option<String>,
}
