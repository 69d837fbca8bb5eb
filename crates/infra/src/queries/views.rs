use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use toolcrib_auth::UserDirectory;
use toolcrib_core::{ToolInstanceId, ToolTypeId, UserId};
use toolcrib_inventory::{InstanceStatus, ToolInstance};

use crate::store::{InventoryStore, StoreError};

/// One instance row joined with the names a person needs to read it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceView {
    pub instance_id: ToolInstanceId,
    pub tool_type_id: ToolTypeId,
    pub tool_name: String,
    pub quantity: u32,
    pub status: InstanceStatus,
    pub holder_id: Option<UserId>,
    pub holder: Option<String>,
    pub pending_counterparty_id: Option<UserId>,
    pub pending_counterparty: Option<String>,
    pub assigned_at: Option<DateTime<Utc>>,
}

impl InstanceView {
    pub fn build<D>(instance: &ToolInstance, tool_name: &str, directory: &D) -> Self
    where
        D: UserDirectory + ?Sized,
    {
        Self {
            instance_id: instance.id(),
            tool_type_id: instance.tool_type_id(),
            tool_name: tool_name.to_string(),
            quantity: instance.quantity().get(),
            status: instance.status(),
            holder_id: instance.holder(),
            holder: instance.holder().map(|id| directory.username(id)),
            pending_counterparty_id: instance.pending_counterparty(),
            pending_counterparty: instance
                .pending_counterparty()
                .map(|id| directory.username(id)),
            assigned_at: instance.assigned_at(),
        }
    }
}

/// Every instance row, stock and loans alike, ordered by tool name and
/// then by row id. The admin landing view.
pub fn instances_overview<S, D>(store: &S, directory: &D) -> Result<Vec<InstanceView>, StoreError>
where
    S: InventoryStore + ?Sized,
    D: UserDirectory + ?Sized,
{
    let names = type_names(store)?;
    let mut views: Vec<InstanceView> = store
        .instances()?
        .into_iter()
        .map(|s| {
            let tool_name = name_or_id(&names, s.row.tool_type_id());
            InstanceView::build(&s.row, &tool_name, directory)
        })
        .collect();
    views.sort_by(|a, b| {
        a.tool_name
            .cmp(&b.tool_name)
            .then(a.instance_id.cmp(&b.instance_id))
    });
    Ok(views)
}

/// Type id to display name, resolved once per query. Rows cannot outlive
/// their type, so a missing name falls back to the raw id only if a reader
/// races a delete.
pub(crate) fn type_names<S>(store: &S) -> Result<HashMap<ToolTypeId, String>, StoreError>
where
    S: InventoryStore + ?Sized,
{
    Ok(store
        .tool_types()?
        .into_iter()
        .map(|s| (s.row.id(), s.row.name().to_string()))
        .collect())
}

pub(crate) fn name_or_id(names: &HashMap<ToolTypeId, String>, id: ToolTypeId) -> String {
    names.get(&id).cloned().unwrap_or_else(|| id.to_string())
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

    #[test]
    fn overview_orders_by_tool_name_then_row_id() {
        let store = Arc::new(InMemoryInventoryStore::new());
        let directory = Arc::new(InMemoryUserDirectory::new());
        let admin_id = UserId::new();
        let ana = UserId::new();
        directory.insert(UserRecord::new(admin_id, "keeper", Role::Admin));
        directory.insert(UserRecord::new(ana, "ana", Role::User));
        let admin = Actor::admin(admin_id);

        let catalog = Catalog::new(store.clone());
        let engine = TransitionEngine::new(store.clone(), directory.clone());

        let saw = catalog.create_tool_type(&admin, "saw", 3).unwrap();
        let drill = catalog.create_tool_type(&admin, "drill", 5).unwrap();
        engine
            .assign(&admin, drill, ana, Quantity::new(2).unwrap())
            .unwrap();

        let views = instances_overview(store.as_ref(), directory.as_ref()).unwrap();
        // Two drill rows after the split, then the saw stock row.
        assert_eq!(views.len(), 3);
        assert!(views[0].tool_name == "drill" && views[1].tool_name == "drill");
        assert_eq!(views[2].tool_type_id, saw);
        assert!(views[0].instance_id < views[1].instance_id);

        let pending = views
            .iter()
            .find(|v| v.status == InstanceStatus::AssignedPending)
            .unwrap();
        assert_eq!(pending.holder.as_deref(), Some("ana"));
        assert_eq!(pending.quantity, 2);
    }
}
