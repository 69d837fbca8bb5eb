use serde::Serialize;

use toolcrib_core::ToolTypeId;

use crate::store::{InventoryStore, StoreError};

/// Stock position of one tool type: what can be handed out right now
/// against the whole fleet, loans included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolEntry {
    pub tool_type_id: ToolTypeId,
    pub name: String,
    pub available: u32,
    pub total: u32,
}

/// Pool overview across all types, sorted by name. Types with nothing
/// available still appear, at zero.
pub fn available_pool<S>(store: &S) -> Result<Vec<PoolEntry>, StoreError>
where
    S: InventoryStore + ?Sized,
{
    let rows = store.instances()?;
    let mut entries: Vec<PoolEntry> = store
        .tool_types()?
        .into_iter()
        .map(|s| PoolEntry {
            tool_type_id: s.row.id(),
            name: s.row.name().to_string(),
            available: 0,
            total: 0,
        })
        .collect();

    for stored in &rows {
        let row = &stored.row;
        if let Some(entry) = entries.iter_mut().find(|e| e.tool_type_id == row.tool_type_id()) {
            entry.total += row.quantity().get();
            if row.is_available() {
                entry.available += row.quantity().get();
            }
        }
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name).then(a.tool_type_id.cmp(&b.tool_type_id)));
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use toolcrib_auth::{Actor, InMemoryUserDirectory, Role, UserRecord};
    use toolcrib_core::{Quantity, UserId};

    use crate::catalog::Catalog;
    use crate::engine::TransitionEngine;
    use crate::store::InMemoryInventoryStore;

    #[test]
    fn pool_counts_available_against_total() {
        let store = Arc::new(InMemoryInventoryStore::new());
        let directory = Arc::new(InMemoryUserDirectory::new());
        let borrower = UserId::new();
        directory.insert(UserRecord::new(borrower, "ana", Role::User));

        let admin = Actor::admin(UserId::new());
        let catalog = Catalog::new(store.clone());
        let engine = TransitionEngine::new(store.clone(), directory);

        catalog.create_tool_type(&admin, "drill", 5).unwrap();
        let saw = catalog.create_tool_type(&admin, "saw", 2).unwrap();
        catalog.create_tool_type(&admin, "crimper", 0).unwrap();
        engine
            .assign(&admin, saw, borrower, Quantity::new(2).unwrap())
            .unwrap();

        let pool = available_pool(store.as_ref()).unwrap();
        let names: Vec<&str> = pool.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["crimper", "drill", "saw"]);

        assert_eq!(pool[0].available, 0);
        assert_eq!(pool[0].total, 0);
        assert_eq!(pool[1].available, 5);
        assert_eq!(pool[2].available, 0);
        assert_eq!(pool[2].total, 2);
    }
}
