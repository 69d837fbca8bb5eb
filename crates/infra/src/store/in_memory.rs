use std::collections::HashMap;
use std::sync::RwLock;

use toolcrib_core::{Entity, ToolInstanceId, ToolTypeId, UserId};
use toolcrib_inventory::{AuditRecord, InstanceStatus};

use super::r#trait::{
    InventoryStore, RowWrite, Stored, StoredInstance, StoredType, StoreError, WriteSet,
};

#[derive(Debug, Default)]
struct State {
    types: HashMap<ToolTypeId, StoredType>,
    instances: HashMap<ToolInstanceId, StoredInstance>,
    audit: Vec<AuditRecord>,
}

/// In-memory row store.
///
/// One lock over the whole state, so a commit is a single critical section
/// and readers always see a consistent snapshot. Intended for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    state: RwLock<State>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_write<E: Entity>(
    table: &HashMap<E::Id, Stored<E>>,
    write: &RowWrite<E>,
) -> Result<(), StoreError> {
    match write {
        RowWrite::Insert(row) => {
            if table.contains_key(&row.id()) {
                return Err(StoreError::InvalidWrite(format!(
                    "insert of existing row {:?}",
                    row.id()
                )));
            }
            Ok(())
        }
        RowWrite::Update { expected, row } => check_revision(table, row.id(), *expected),
        RowWrite::Remove { expected, id } => check_revision(table, *id, *expected),
    }
}

fn check_revision<E: Entity>(
    table: &HashMap<E::Id, Stored<E>>,
    id: E::Id,
    expected: u64,
) -> Result<(), StoreError> {
    match table.get(&id) {
        None => Err(StoreError::Conflict(format!(
            "row {id:?} was removed concurrently"
        ))),
        Some(stored) if stored.revision != expected => Err(StoreError::Conflict(format!(
            "row {id:?} is at revision {}, write expected {expected}",
            stored.revision
        ))),
        Some(_) => Ok(()),
    }
}

fn apply_write<E: Entity>(table: &mut HashMap<E::Id, Stored<E>>, write: RowWrite<E>) {
    match write {
        RowWrite::Insert(row) => {
            table.insert(row.id(), Stored { revision: 1, row });
        }
        RowWrite::Update { expected, row } => {
            table.insert(
                row.id(),
                Stored {
                    revision: expected + 1,
                    row,
                },
            );
        }
        RowWrite::Remove { id, .. } => {
            table.remove(&id);
        }
    }
}

impl InventoryStore for InMemoryInventoryStore {
    fn commit(&self, writes: WriteSet) -> Result<(), StoreError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;

        // Every guard is checked before anything is applied.
        for write in &writes.types {
            check_write(&state.types, write)?;
        }
        for write in &writes.instances {
            check_write(&state.instances, write)?;
        }

        for write in writes.types {
            apply_write(&mut state.types, write);
        }
        for write in writes.instances {
            apply_write(&mut state.instances, write);
        }
        state.audit.extend(writes.audit);
        Ok(())
    }

    fn tool_type(&self, id: ToolTypeId) -> Result<Option<StoredType>, StoreError> {
        let state = self
            .state
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;
        Ok(state.types.get(&id).cloned())
    }

    fn tool_types(&self) -> Result<Vec<StoredType>, StoreError> {
        let state = self
            .state
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;
        Ok(state.types.values().cloned().collect())
    }

    fn instance(&self, id: ToolInstanceId) -> Result<Option<StoredInstance>, StoreError> {
        let state = self
            .state
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;
        Ok(state.instances.get(&id).cloned())
    }

    fn instances(&self) -> Result<Vec<StoredInstance>, StoreError> {
        let state = self
            .state
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;
        Ok(state.instances.values().cloned().collect())
    }

    fn instances_of_type(
        &self,
        tool_type_id: ToolTypeId,
    ) -> Result<Vec<StoredInstance>, StoreError> {
        let state = self
            .state
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;
        Ok(state
            .instances
            .values()
            .filter(|s| s.row.tool_type_id() == tool_type_id)
            .cloned()
            .collect())
    }

    fn instances_held_by(&self, holder: UserId) -> Result<Vec<StoredInstance>, StoreError> {
        let state = self
            .state
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;
        Ok(state
            .instances
            .values()
            .filter(|s| s.row.holder() == Some(holder))
            .cloned()
            .collect())
    }

    fn instances_with_status(
        &self,
        status: InstanceStatus,
    ) -> Result<Vec<StoredInstance>, StoreError> {
        let state = self
            .state
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;
        Ok(state
            .instances
            .values()
            .filter(|s| s.row.status() == status)
            .cloned()
            .collect())
    }

    fn audit_log(&self) -> Result<Vec<AuditRecord>, StoreError> {
        let state = self
            .state
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;
        Ok(state.audit.clone())
    }
}
