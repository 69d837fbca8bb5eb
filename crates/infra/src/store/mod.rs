//! Row storage boundary.
//!
//! Defines the store abstraction the engine and catalog write through,
//! without making storage assumptions. Writes travel as guarded
//! `WriteSet`s; optimistic revision checks turn lost updates into
//! `StoreError::Conflict`.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryInventoryStore;
pub use r#trait::{
    InstanceWrite, InventoryStore, RowWrite, Stored, StoredInstance, StoredType, StoreError,
    TypeWrite, WriteSet,
};

use toolcrib_core::ToolInstanceId;

/// The stock row assignments draw from and returned batches merge into:
/// the biggest available batch of the type, id as the tie-break.
pub fn largest_available_row(
    rows: &[StoredInstance],
    excluding: Option<ToolInstanceId>,
) -> Option<StoredInstance> {
    rows.iter()
        .filter(|s| s.row.is_available() && Some(s.row.id()) != excluding)
        .max_by_key(|s| (s.row.quantity().get(), s.row.id()))
        .cloned()
}
