//! Audit vocabulary for committed mutations.
//!
//! Every successful commit appends exactly one record. Everything in a
//! record is decided where the mutation is decided; the store only appends
//! it, in commit order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use toolcrib_core::{ToolInstanceId, ToolTypeId, UserId};

use crate::InstanceStatus;

/// What happened, in report vocabulary.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Assigned,
    AssignmentConfirmed,
    AssignmentRejected,
    TransferRequested,
    TransferConfirmed,
    TransferRejected,
    ReturnRequested,
    ReturnAccepted,
    ReturnRejected,
    ToolTypeCreated,
    ToolTypeUpdated,
    ToolTypeDeleted,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Assigned => "assigned",
            AuditAction::AssignmentConfirmed => "assignment_confirmed",
            AuditAction::AssignmentRejected => "assignment_rejected",
            AuditAction::TransferRequested => "transfer_requested",
            AuditAction::TransferConfirmed => "transfer_confirmed",
            AuditAction::TransferRejected => "transfer_rejected",
            AuditAction::ReturnRequested => "return_requested",
            AuditAction::ReturnAccepted => "return_accepted",
            AuditAction::ReturnRejected => "return_rejected",
            AuditAction::ToolTypeCreated => "tool_type_created",
            AuditAction::ToolTypeUpdated => "tool_type_updated",
            AuditAction::ToolTypeDeleted => "tool_type_deleted",
        }
    }
}

impl core::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One committed mutation.
///
/// The tool name is denormalized so reports survive type deletion.
/// `holder_id` is the user holding (or handing back) the batch in this event;
/// `counterparty_id` is set only while a confirmation is being requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub occurred_at: DateTime<Utc>,
    pub actor_id: UserId,
    pub action: AuditAction,
    pub tool_type_id: ToolTypeId,
    pub tool_name: String,
    pub instance_id: Option<ToolInstanceId>,
    pub quantity: u32,
    pub prior_status: Option<InstanceStatus>,
    pub new_status: Option<InstanceStatus>,
    pub holder_id: Option<UserId>,
    pub counterparty_id: Option<UserId>,
}
