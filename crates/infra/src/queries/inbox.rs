use toolcrib_auth::UserDirectory;
use toolcrib_core::UserId;
use toolcrib_inventory::InstanceStatus;

use crate::store::{InventoryStore, StoreError, StoredInstance};

use super::views::{name_or_id, type_names, InstanceView};

/// Rows waiting on `user` to confirm or reject: assignments addressed to
/// them and transfers offered to them.
pub fn inbox_for<S, D>(
    store: &S,
    directory: &D,
    user: UserId,
) -> Result<Vec<InstanceView>, StoreError>
where
    S: InventoryStore + ?Sized,
    D: UserDirectory + ?Sized,
{
    let rows = store.instances()?;
    collect(store, directory, rows, |row| {
        row.pending_counterparty() == Some(user) && row.status().is_pending()
    })
}

/// Rows `user` currently holds, including ones parked in a pending
/// transfer or return. Assignments they have not confirmed yet show up in
/// the inbox instead.
pub fn borrowed_by<S, D>(
    store: &S,
    directory: &D,
    user: UserId,
) -> Result<Vec<InstanceView>, StoreError>
where
    S: InventoryStore + ?Sized,
    D: UserDirectory + ?Sized,
{
    let rows = store.instances_held_by(user)?;
    collect(store, directory, rows, |row| {
        matches!(
            row.status(),
            InstanceStatus::Borrowed
                | InstanceStatus::TransferPending
                | InstanceStatus::ReturnPending
        )
    })
}

/// The admin settlement queue: every return waiting for accept/reject.
pub fn pending_returns<S, D>(store: &S, directory: &D) -> Result<Vec<InstanceView>, StoreError>
where
    S: InventoryStore + ?Sized,
    D: UserDirectory + ?Sized,
{
    let rows = store.instances_with_status(InstanceStatus::ReturnPending)?;
    collect(store, directory, rows, |_| true)
}

/// Every transfer in flight, regardless of who is involved.
pub fn pending_transfers<S, D>(store: &S, directory: &D) -> Result<Vec<InstanceView>, StoreError>
where
    S: InventoryStore + ?Sized,
    D: UserDirectory + ?Sized,
{
    let rows = store.instances_with_status(InstanceStatus::TransferPending)?;
    collect(store, directory, rows, |_| true)
}

fn collect<S, D, F>(
    store: &S,
    directory: &D,
    rows: Vec<StoredInstance>,
    keep: F,
) -> Result<Vec<InstanceView>, StoreError>
where
    S: InventoryStore + ?Sized,
    D: UserDirectory + ?Sized,
    F: Fn(&toolcrib_inventory::ToolInstance) -> bool,
{
    let names = type_names(store)?;
    let mut views: Vec<InstanceView> = rows
        .into_iter()
        .filter(|s| keep(&s.row))
        .map(|s| {
            let tool_name = name_or_id(&names, s.row.tool_type_id());
            InstanceView::build(&s.row, &tool_name, directory)
        })
        .collect();
    // Ids are time-ordered, so this is creation order.
    views.sort_by_key(|v| v.instance_id);
    Ok(views)
}
