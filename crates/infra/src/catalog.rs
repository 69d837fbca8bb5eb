//! Tool type administration: creating, renaming, restocking and retiring
//! catalog entries.
//!
//! Catalog writes go through the same store and audit append as lifecycle
//! transitions, but they are not part of the instance state machine: stock
//! only ever changes through the available row of a type, so units out on
//! loan are never touched from here.

use chrono::Utc;

use toolcrib_auth::{require_admin, Actor};
use toolcrib_core::{Quantity, ToolInstanceId, ToolTypeId};
use toolcrib_inventory::{AuditAction, AuditRecord, InstanceStatus, ToolInstance, ToolType};

use crate::engine::EngineError;
use crate::store::{
    largest_available_row, InstanceWrite, InventoryStore, TypeWrite, WriteSet,
};

/// Admin operations on the tool catalog.
#[derive(Debug)]
pub struct Catalog<S> {
    store: S,
}

impl<S> Catalog<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S> Catalog<S>
where
    S: InventoryStore,
{
    /// Add a tool type, seeding its pool with `initial_quantity` units.
    /// Zero is allowed; the type then exists with nothing to hand out.
    pub fn create_tool_type(
        &self,
        actor: &Actor,
        name: &str,
        initial_quantity: u32,
    ) -> Result<ToolTypeId, EngineError> {
        require_admin(actor)?;
        let tool_type = ToolType::new(ToolTypeId::new(), name)?;
        self.ensure_name_free(tool_type.name(), None)?;
        let id = tool_type.id();

        let mut writes = WriteSet::default();
        let mut audit = AuditRecord {
            occurred_at: Utc::now(),
            actor_id: actor.user_id,
            action: AuditAction::ToolTypeCreated,
            tool_type_id: id,
            tool_name: tool_type.name().to_string(),
            instance_id: None,
            quantity: initial_quantity,
            prior_status: None,
            new_status: None,
            holder_id: None,
            counterparty_id: None,
        };
        if initial_quantity > 0 {
            let row =
                ToolInstance::available(ToolInstanceId::new(), id, Quantity::new(initial_quantity)?);
            audit.instance_id = Some(row.id());
            audit.new_status = Some(InstanceStatus::Available);
            writes.instances.push(InstanceWrite::Insert(row));
        }
        writes.types.push(TypeWrite::Insert(tool_type));
        writes.audit.push(audit);

        self.store.commit(writes)?;
        tracing::info!(tool_type_id = %id, quantity = initial_quantity, "tool type created");
        Ok(id)
    }

    /// Rename a type and/or set its total fleet size. Growth lands in the
    /// available pool; shrinkage must come out of it, so a cut deeper than
    /// the current stock fails rather than touching units on loan.
    pub fn update_tool_type(
        &self,
        actor: &Actor,
        id: ToolTypeId,
        name: Option<String>,
        total_quantity: Option<u32>,
    ) -> Result<(), EngineError> {
        require_admin(actor)?;
        if name.is_none() && total_quantity.is_none() {
            return Err(EngineError::Validation(
                "update requires a name or a total quantity".to_string(),
            ));
        }

        let stored = self
            .store
            .tool_type(id)?
            .ok_or_else(|| EngineError::NotFound(format!("tool type {id}")))?;
        let rows = self.store.instances_of_type(id)?;
        let current_total: u64 = rows.iter().map(|s| u64::from(s.row.quantity().get())).sum();

        let mut writes = WriteSet::default();

        let tool_type = match name {
            Some(new_name) => {
                let renamed = stored.row.renamed(new_name)?;
                self.ensure_name_free(renamed.name(), Some(id))?;
                writes.types.push(TypeWrite::Update {
                    expected: stored.revision,
                    row: renamed.clone(),
                });
                renamed
            }
            None => stored.row,
        };

        let mut resulting_total = current_total;
        if let Some(new_total) = total_quantity {
            resulting_total = u64::from(new_total);
            if resulting_total > current_total {
                let grow_by = Quantity::new((resulting_total - current_total) as u32)?;
                match largest_available_row(&rows, None) {
                    Some(stock) => {
                        let grown = stock
                            .row
                            .resized(stock.row.quantity().checked_add(grow_by)?)?;
                        writes.instances.push(InstanceWrite::Update {
                            expected: stock.revision,
                            row: grown,
                        });
                    }
                    None => {
                        writes.instances.push(InstanceWrite::Insert(
                            ToolInstance::available(ToolInstanceId::new(), id, grow_by),
                        ));
                    }
                }
            } else if resulting_total < current_total {
                let shrink_by = (current_total - resulting_total) as u32;
                let stock = largest_available_row(&rows, None).ok_or(
                    EngineError::InsufficientQuantity {
                        requested: shrink_by,
                        available: 0,
                    },
                )?;
                let have = stock.row.quantity().get();
                if have < shrink_by {
                    return Err(EngineError::InsufficientQuantity {
                        requested: shrink_by,
                        available: have,
                    });
                }
                if have == shrink_by {
                    writes.instances.push(InstanceWrite::Remove {
                        expected: stock.revision,
                        id: stock.row.id(),
                    });
                } else {
                    let shrunk = stock.row.resized(Quantity::new(have - shrink_by)?)?;
                    writes.instances.push(InstanceWrite::Update {
                        expected: stock.revision,
                        row: shrunk,
                    });
                }
            }
        }

        writes.audit.push(AuditRecord {
            occurred_at: Utc::now(),
            actor_id: actor.user_id,
            action: AuditAction::ToolTypeUpdated,
            tool_type_id: id,
            tool_name: tool_type.name().to_string(),
            instance_id: None,
            quantity: resulting_total as u32,
            prior_status: None,
            new_status: None,
            holder_id: None,
            counterparty_id: None,
        });

        self.store.commit(writes)?;
        tracing::info!(tool_type_id = %id, total = resulting_total, "tool type updated");
        Ok(())
    }

    /// Retire a type. Refused while any instance is out of the pool; the
    /// loans have to come back (or be settled) first.
    pub fn delete_tool_type(&self, actor: &Actor, id: ToolTypeId) -> Result<(), EngineError> {
        require_admin(actor)?;
        let stored = self
            .store
            .tool_type(id)?
            .ok_or_else(|| EngineError::NotFound(format!("tool type {id}")))?;
        let rows = self.store.instances_of_type(id)?;

        if let Some(on_loan) = rows.iter().find(|s| !s.row.is_available()) {
            return Err(EngineError::InvalidTransition(format!(
                "cannot delete '{}': instance {} is {}",
                stored.row.name(),
                on_loan.row.id(),
                on_loan.row.status()
            )));
        }

        let removed_total: u32 = rows.iter().map(|s| s.row.quantity().get()).sum();
        let mut writes = WriteSet::default();
        for s in rows {
            writes.instances.push(InstanceWrite::Remove {
                expected: s.revision,
                id: s.row.id(),
            });
        }
        writes.types.push(TypeWrite::Remove {
            expected: stored.revision,
            id,
        });
        writes.audit.push(AuditRecord {
            occurred_at: Utc::now(),
            actor_id: actor.user_id,
            action: AuditAction::ToolTypeDeleted,
            tool_type_id: id,
            tool_name: stored.row.name().to_string(),
            instance_id: None,
            quantity: removed_total,
            prior_status: None,
            new_status: None,
            holder_id: None,
            counterparty_id: None,
        });

        self.store.commit(writes)?;
        tracing::info!(tool_type_id = %id, "tool type deleted");
        Ok(())
    }

    fn ensure_name_free(
        &self,
        name: &str,
        excluding: Option<ToolTypeId>,
    ) -> Result<(), EngineError> {
        let taken = self.store.tool_types()?.into_iter().any(|t| {
            Some(t.row.id()) != excluding && t.row.name().eq_ignore_ascii_case(name)
        });
        if taken {
            return Err(EngineError::Validation(format!(
                "a tool type named '{name}' already exists"
            )));
        }
        Ok(())
    }
}
