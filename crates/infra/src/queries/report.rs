use chrono::{DateTime, Utc};
use serde::Serialize;

use toolcrib_auth::UserDirectory;
use toolcrib_core::{ToolInstanceId, ToolTypeId, UserId};
use toolcrib_inventory::{AuditAction, InstanceStatus};

use crate::store::{InventoryStore, StoreError};

/// Optional report filters; empty means the whole log.
#[derive(Debug, Clone, Default)]
pub struct AuditQuery {
    /// Case-insensitive substring of the tool name as recorded.
    pub tool_name: Option<String>,
    /// Resulting status of the recorded event.
    pub status: Option<InstanceStatus>,
    /// Case-insensitive substring of any involved user's name.
    pub username: Option<String>,
}

/// One audit record with usernames resolved for display.
///
/// Tool names come from the record itself, so entries survive a type
/// deletion; usernames resolve at read time and fall back to the raw id
/// for users the directory no longer knows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditView {
    pub occurred_at: DateTime<Utc>,
    pub action: AuditAction,
    pub tool_type_id: ToolTypeId,
    pub tool_name: String,
    pub instance_id: Option<ToolInstanceId>,
    pub quantity: u32,
    pub status: Option<InstanceStatus>,
    pub actor_id: UserId,
    pub actor: String,
    pub holder: Option<String>,
    pub counterparty: Option<String>,
}

/// Audit trail, newest first.
pub fn audit_report<S, D>(
    store: &S,
    directory: &D,
    query: &AuditQuery,
) -> Result<Vec<AuditView>, StoreError>
where
    S: InventoryStore + ?Sized,
    D: UserDirectory + ?Sized,
{
    let tool_needle = query.tool_name.as_deref().map(str::to_lowercase);
    let user_needle = query.username.as_deref().map(str::to_lowercase);

    let mut views = Vec::new();
    for record in store.audit_log()? {
        if let Some(needle) = &tool_needle {
            if !record.tool_name.to_lowercase().contains(needle) {
                continue;
            }
        }
        if let Some(wanted) = query.status {
            if record.new_status != Some(wanted) {
                continue;
            }
        }

        let actor = directory.username(record.actor_id);
        let holder = record.holder_id.map(|id| directory.username(id));
        let counterparty = record.counterparty_id.map(|id| directory.username(id));

        if let Some(needle) = &user_needle {
            let involved = std::iter::once(&actor)
                .chain(holder.iter())
                .chain(counterparty.iter())
                .any(|name| name.to_lowercase().contains(needle));
            if !involved {
                continue;
            }
        }

        views.push(AuditView {
            occurred_at: record.occurred_at,
            action: record.action,
            tool_type_id: record.tool_type_id,
            tool_name: record.tool_name,
            instance_id: record.instance_id,
            quantity: record.quantity,
            status: record.new_status,
            actor_id: record.actor_id,
            actor,
            holder,
            counterparty,
        });
    }

    views.reverse();
    Ok(views)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use toolcrib_auth::{Actor, InMemoryUserDirectory, Role, UserRecord};
    use toolcrib_core::Quantity;

    use crate::catalog::Catalog;
    use crate::engine::TransitionEngine;
    use crate::store::InMemoryInventoryStore;

    fn seeded() -> (
        Arc<InMemoryInventoryStore>,
        Arc<InMemoryUserDirectory>,
    ) {
        let store = Arc::new(InMemoryInventoryStore::new());
        let directory = Arc::new(InMemoryUserDirectory::new());
        let admin_id = UserId::new();
        let ana = UserId::new();
        directory.insert(UserRecord::new(admin_id, "keeper", Role::Admin));
        directory.insert(UserRecord::new(ana, "ana", Role::User));

        let admin = Actor::admin(admin_id);
        let catalog = Catalog::new(store.clone());
        let engine = TransitionEngine::new(store.clone(), directory.clone());

        let drill = catalog.create_tool_type(&admin, "drill", 5).unwrap();
        catalog.create_tool_type(&admin, "saw", 1).unwrap();
        let pending = engine
            .assign(&admin, drill, ana, Quantity::new(2).unwrap())
            .unwrap();
        engine.confirm_assignment(&Actor::user(ana), pending).unwrap();

        (store, directory)
    }

    #[test]
    fn unfiltered_report_is_newest_first() {
        let (store, directory) = seeded();
        let report =
            audit_report(store.as_ref(), directory.as_ref(), &AuditQuery::default()).unwrap();
        assert_eq!(report.len(), 4);
        assert_eq!(report[0].action, AuditAction::AssignmentConfirmed);
        assert_eq!(report[3].action, AuditAction::ToolTypeCreated);
    }

    #[test]
    fn tool_name_filter_is_a_substring_match() {
        let (store, directory) = seeded();
        let query = AuditQuery {
            tool_name: Some("DRI".to_string()),
            ..AuditQuery::default()
        };
        let report = audit_report(store.as_ref(), directory.as_ref(), &query).unwrap();
        assert_eq!(report.len(), 3);
        assert!(report.iter().all(|v| v.tool_name == "drill"));
    }

    #[test]
    fn status_filter_matches_the_resulting_status() {
        let (store, directory) = seeded();
        let query = AuditQuery {
            status: Some(InstanceStatus::Borrowed),
            ..AuditQuery::default()
        };
        let report = audit_report(store.as_ref(), directory.as_ref(), &query).unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].action, AuditAction::AssignmentConfirmed);
    }

    #[test]
    fn username_filter_matches_any_involved_user() {
        let (store, directory) = seeded();
        let query = AuditQuery {
            username: Some("ana".to_string()),
            ..AuditQuery::default()
        };
        let report = audit_report(store.as_ref(), directory.as_ref(), &query).unwrap();
        // ana holds the assignment and confirmed it.
        assert_eq!(report.len(), 2);

        let query = AuditQuery {
            username: Some("keeper".to_string()),
            ..AuditQuery::default()
        };
        let report = audit_report(store.as_ref(), directory.as_ref(), &query).unwrap();
        // keeper created both types and made the assignment.
        assert_eq!(report.len(), 3);
    }
}
