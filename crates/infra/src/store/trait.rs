use thiserror::Error;

use std::sync::Arc;

use toolcrib_core::{Entity, ToolInstanceId, ToolTypeId, UserId};
use toolcrib_inventory::{AuditRecord, InstanceStatus, ToolInstance, ToolType};

/// A row plus the revision counter the store tracks for it.
///
/// Revisions start at 1 on insert and bump by 1 on every update. Writers
/// carry the revision they loaded; a mismatch at commit time means someone
/// else wrote in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stored<T> {
    pub revision: u64,
    pub row: T,
}

pub type StoredType = Stored<ToolType>;
pub type StoredInstance = Stored<ToolInstance>;

/// One guarded write against a row table.
///
/// `Insert` requires the id to be free; `Update` and `Remove` require the
/// row to still be at the revision the writer loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowWrite<E: Entity> {
    Insert(E),
    Update { expected: u64, row: E },
    Remove { expected: u64, id: E::Id },
}

pub type TypeWrite = RowWrite<ToolType>;
pub type InstanceWrite = RowWrite<ToolInstance>;

/// One atomic unit of work: row writes plus the audit records describing
/// them. Either the whole set commits or none of it does.
#[derive(Debug, Clone, Default)]
pub struct WriteSet {
    pub types: Vec<TypeWrite>,
    pub instances: Vec<InstanceWrite>,
    pub audit: Vec<AuditRecord>,
}

/// Store operation error.
///
/// These are infrastructure failures, as opposed to domain rule failures.
/// `Conflict` is the optimistic concurrency signal and is safe to retry
/// after re-reading.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("concurrent modification: {0}")]
    Conflict(String),

    #[error("invalid write: {0}")]
    InvalidWrite(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

/// Row storage for the tool inventory.
///
/// Reads return point-in-time snapshots. `commit` applies a `WriteSet`
/// atomically after checking every guard in it: no partial writes, and the
/// audit append happens in the same unit of work as the rows it describes.
pub trait InventoryStore: Send + Sync {
    fn commit(&self, writes: WriteSet) -> Result<(), StoreError>;

    fn tool_type(&self, id: ToolTypeId) -> Result<Option<StoredType>, StoreError>;

    fn tool_types(&self) -> Result<Vec<StoredType>, StoreError>;

    fn instance(&self, id: ToolInstanceId) -> Result<Option<StoredInstance>, StoreError>;

    fn instances(&self) -> Result<Vec<StoredInstance>, StoreError>;

    fn instances_of_type(
        &self,
        tool_type_id: ToolTypeId,
    ) -> Result<Vec<StoredInstance>, StoreError>;

    fn instances_held_by(&self, holder: UserId) -> Result<Vec<StoredInstance>, StoreError>;

    fn instances_with_status(
        &self,
        status: InstanceStatus,
    ) -> Result<Vec<StoredInstance>, StoreError>;

    /// Full audit log in append order.
    fn audit_log(&self) -> Result<Vec<AuditRecord>, StoreError>;
}

impl<S> InventoryStore for Arc<S>
where
    S: InventoryStore + ?Sized,
{
    fn commit(&self, writes: WriteSet) -> Result<(), StoreError> {
        (**self).commit(writes)
    }

    fn tool_type(&self, id: ToolTypeId) -> Result<Option<StoredType>, StoreError> {
        (**self).tool_type(id)
    }

    fn tool_types(&self) -> Result<Vec<StoredType>, StoreError> {
        (**self).tool_types()
    }

    fn instance(&self, id: ToolInstanceId) -> Result<Option<StoredInstance>, StoreError> {
        (**self).instance(id)
    }

    fn instances(&self) -> Result<Vec<StoredInstance>, StoreError> {
        (**self).instances()
    }

    fn instances_of_type(
        &self,
        tool_type_id: ToolTypeId,
    ) -> Result<Vec<StoredInstance>, StoreError> {
        (**self).instances_of_type(tool_type_id)
    }

    fn instances_held_by(&self, holder: UserId) -> Result<Vec<StoredInstance>, StoreError> {
        (**self).instances_held_by(holder)
    }

    fn instances_with_status(
        &self,
        status: InstanceStatus,
    ) -> Result<Vec<StoredInstance>, StoreError> {
        (**self).instances_with_status(status)
    }

    fn audit_log(&self) -> Result<Vec<AuditRecord>, StoreError> {
        (**self).audit_log()
    }
}
