use chrono::{DateTime, Utc};
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use toolcrib_auth::Actor;
use toolcrib_core::{DomainError, DomainResult, Entity, Quantity, ToolInstanceId, ToolTypeId, UserId};

use crate::{AuditAction, AuditRecord, ToolType};

/// Lifecycle status of a tool instance.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceStatus {
    Available,
    AssignedPending,
    Borrowed,
    TransferPending,
    ReturnPending,
}

impl InstanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceStatus::Available => "available",
            InstanceStatus::AssignedPending => "assigned_pending",
            InstanceStatus::Borrowed => "borrowed",
            InstanceStatus::TransferPending => "transfer_pending",
            InstanceStatus::ReturnPending => "return_pending",
        }
    }

    /// States waiting on a counterparty's confirm/reject.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            InstanceStatus::AssignedPending
                | InstanceStatus::TransferPending
                | InstanceStatus::ReturnPending
        )
    }
}

impl core::fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstanceStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(InstanceStatus::Available),
            "assigned_pending" => Ok(InstanceStatus::AssignedPending),
            "borrowed" => Ok(InstanceStatus::Borrowed),
            "transfer_pending" => Ok(InstanceStatus::TransferPending),
            "return_pending" => Ok(InstanceStatus::ReturnPending),
            other => Err(DomainError::validation(format!("unknown status: {other}"))),
        }
    }
}

/// One quantity-bearing batch of a tool type, at rest with one holder (or
/// unheld, when available).
///
/// Field coupling is strict: a holder exists iff the instance is not
/// `Available`; a pending counterparty exists iff the status is
/// `AssignedPending` or `TransferPending`; `assigned_at` tracks the holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInstance {
    id: ToolInstanceId,
    tool_type_id: ToolTypeId,
    quantity: Quantity,
    status: InstanceStatus,
    holder: Option<UserId>,
    pending_counterparty: Option<UserId>,
    assigned_at: Option<DateTime<Utc>>,
}

/// Result of a successful transition decision: rows to write, rows to
/// remove, and the audit record to append. Committing all of it atomically
/// is the store's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPlan {
    /// The row the event acted on (reported back to the caller).
    pub instance_id: ToolInstanceId,
    /// Rows to insert or update.
    pub updates: Vec<ToolInstance>,
    /// Rows merged away.
    pub removals: Vec<ToolInstanceId>,
    /// Record to append on commit.
    pub audit: AuditRecord,
}

impl ToolInstance {
    /// Fresh unheld stock.
    pub fn available(id: ToolInstanceId, tool_type_id: ToolTypeId, quantity: Quantity) -> Self {
        Self {
            id,
            tool_type_id,
            quantity,
            status: InstanceStatus::Available,
            holder: None,
            pending_counterparty: None,
            assigned_at: None,
        }
    }

    pub fn id(&self) -> ToolInstanceId {
        self.id
    }

    pub fn tool_type_id(&self) -> ToolTypeId {
        self.tool_type_id
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn status(&self) -> InstanceStatus {
        self.status
    }

    pub fn holder(&self) -> Option<UserId> {
        self.holder
    }

    pub fn pending_counterparty(&self) -> Option<UserId> {
        self.pending_counterparty
    }

    pub fn assigned_at(&self) -> Option<DateTime<Utc>> {
        self.assigned_at
    }

    pub fn is_available(&self) -> bool {
        self.status == InstanceStatus::Available
    }

    /// Same row at a different batch size. Stock adjustments only; rows
    /// on loan never change size.
    pub fn resized(&self, quantity: Quantity) -> DomainResult<Self> {
        self.ensure_status(InstanceStatus::Available, "resize stock")?;
        let mut resized = self.clone();
        resized.quantity = quantity;
        Ok(resized)
    }

    /// Field-coupling check; useful for property tests and store assertions.
    pub fn check_invariants(&self) -> DomainResult<()> {
        let held = self.holder.is_some();
        if held == (self.status == InstanceStatus::Available) {
            return Err(DomainError::validation(
                "holder must be set exactly when the instance is not available",
            ));
        }
        if held != self.assigned_at.is_some() {
            return Err(DomainError::validation(
                "assigned_at must track the holder",
            ));
        }
        match self.status {
            InstanceStatus::AssignedPending => {
                if self.pending_counterparty != self.holder {
                    return Err(DomainError::validation(
                        "a pending assignment is confirmed by its assignee",
                    ));
                }
            }
            InstanceStatus::TransferPending => {
                if self.pending_counterparty.is_none()
                    || self.pending_counterparty == self.holder
                {
                    return Err(DomainError::validation(
                        "a pending transfer targets a user other than the holder",
                    ));
                }
            }
            _ => {
                if self.pending_counterparty.is_some() {
                    return Err(DomainError::validation(
                        "only pending assignments and transfers carry a counterparty",
                    ));
                }
            }
        }
        Ok(())
    }
}

impl Entity for ToolInstance {
    type Id = ToolInstanceId;

    fn id(&self) -> ToolInstanceId {
        self.id
    }
}

// ── Transition table ────────────────────────────────────────────────────────
//
// Every legal transition of the lifecycle is decided here and nowhere else.
// Methods never mutate `self`; they return a plan or an error.

impl ToolInstance {
    /// Available → AssignedPending. Admin hands `requested` units to
    /// `to_user`; a partial take splits the batch, the residual stays
    /// available under the original id and the pending part gets `split_id`.
    pub fn assign(
        &self,
        tool_type: &ToolType,
        actor: &Actor,
        to_user: UserId,
        requested: Quantity,
        split_id: ToolInstanceId,
        at: DateTime<Utc>,
    ) -> DomainResult<TransitionPlan> {
        self.ensure_type(tool_type)?;
        self.ensure_status(InstanceStatus::Available, "assign")?;
        ensure_admin(actor, "assign tools")?;

        let residual = self.quantity.split(requested)?;
        let pending = Self {
            id: if residual.is_some() { split_id } else { self.id },
            tool_type_id: self.tool_type_id,
            quantity: requested,
            status: InstanceStatus::AssignedPending,
            holder: Some(to_user),
            pending_counterparty: Some(to_user),
            assigned_at: Some(at),
        };

        let mut updates = Vec::with_capacity(2);
        if let Some(left) = residual {
            let mut rest = self.clone();
            rest.quantity = left;
            updates.push(rest);
        }
        let instance_id = pending.id;
        updates.push(pending);

        Ok(TransitionPlan {
            instance_id,
            updates,
            removals: vec![],
            audit: AuditRecord {
                occurred_at: at,
                actor_id: actor.user_id,
                action: AuditAction::Assigned,
                tool_type_id: self.tool_type_id,
                tool_name: tool_type.name().to_string(),
                instance_id: Some(instance_id),
                quantity: requested.get(),
                prior_status: Some(InstanceStatus::Available),
                new_status: Some(InstanceStatus::AssignedPending),
                holder_id: Some(to_user),
                counterparty_id: Some(to_user),
            },
        })
    }

    /// AssignedPending → Borrowed, by the assignee.
    pub fn confirm_assignment(
        &self,
        tool_type: &ToolType,
        actor: &Actor,
        at: DateTime<Utc>,
    ) -> DomainResult<TransitionPlan> {
        self.ensure_type(tool_type)?;
        self.ensure_status(InstanceStatus::AssignedPending, "confirm an assignment")?;
        self.ensure_counterparty(actor, "confirm an assignment")?;

        let mut confirmed = self.clone();
        confirmed.status = InstanceStatus::Borrowed;
        confirmed.pending_counterparty = None;

        Ok(TransitionPlan {
            instance_id: self.id,
            updates: vec![confirmed],
            removals: vec![],
            audit: self.audit(
                tool_type,
                actor,
                AuditAction::AssignmentConfirmed,
                InstanceStatus::Borrowed,
                self.holder,
                None,
                at,
            ),
        })
    }

    /// AssignedPending → Available, by the assignee. The batch goes back to
    /// stock, merging into `stock` when a row is given.
    pub fn reject_assignment(
        &self,
        tool_type: &ToolType,
        actor: &Actor,
        stock: Option<&ToolInstance>,
        at: DateTime<Utc>,
    ) -> DomainResult<TransitionPlan> {
        self.ensure_type(tool_type)?;
        self.ensure_status(InstanceStatus::AssignedPending, "reject an assignment")?;
        self.ensure_counterparty(actor, "reject an assignment")?;

        let (updates, removals) = self.merge_into_stock(stock)?;
        Ok(TransitionPlan {
            instance_id: self.id,
            updates,
            removals,
            audit: self.audit(
                tool_type,
                actor,
                AuditAction::AssignmentRejected,
                InstanceStatus::Available,
                self.holder,
                None,
                at,
            ),
        })
    }

    /// Borrowed → TransferPending, by the holder, towards `to_user`.
    pub fn request_transfer(
        &self,
        tool_type: &ToolType,
        actor: &Actor,
        to_user: UserId,
        at: DateTime<Utc>,
    ) -> DomainResult<TransitionPlan> {
        self.ensure_type(tool_type)?;
        self.ensure_status(InstanceStatus::Borrowed, "request a transfer")?;
        self.ensure_holder(actor, "request a transfer")?;
        if Some(to_user) == self.holder {
            return Err(DomainError::validation(
                "cannot transfer to the current holder",
            ));
        }

        let mut offered = self.clone();
        offered.status = InstanceStatus::TransferPending;
        offered.pending_counterparty = Some(to_user);

        Ok(TransitionPlan {
            instance_id: self.id,
            updates: vec![offered],
            removals: vec![],
            audit: self.audit(
                tool_type,
                actor,
                AuditAction::TransferRequested,
                InstanceStatus::TransferPending,
                self.holder,
                Some(to_user),
                at,
            ),
        })
    }

    /// TransferPending → Borrowed with the counterparty as new holder.
    pub fn confirm_transfer(
        &self,
        tool_type: &ToolType,
        actor: &Actor,
        at: DateTime<Utc>,
    ) -> DomainResult<TransitionPlan> {
        self.ensure_type(tool_type)?;
        self.ensure_status(InstanceStatus::TransferPending, "confirm a transfer")?;
        self.ensure_counterparty(actor, "confirm a transfer")?;

        let mut taken = self.clone();
        taken.status = InstanceStatus::Borrowed;
        taken.holder = Some(actor.user_id);
        taken.pending_counterparty = None;
        taken.assigned_at = Some(at);

        Ok(TransitionPlan {
            instance_id: self.id,
            updates: vec![taken],
            removals: vec![],
            audit: self.audit(
                tool_type,
                actor,
                AuditAction::TransferConfirmed,
                InstanceStatus::Borrowed,
                Some(actor.user_id),
                None,
                at,
            ),
        })
    }

    /// TransferPending → Borrowed with the original holder, by the
    /// counterparty declining.
    pub fn reject_transfer(
        &self,
        tool_type: &ToolType,
        actor: &Actor,
        at: DateTime<Utc>,
    ) -> DomainResult<TransitionPlan> {
        self.ensure_type(tool_type)?;
        self.ensure_status(InstanceStatus::TransferPending, "reject a transfer")?;
        self.ensure_counterparty(actor, "reject a transfer")?;

        let mut kept = self.clone();
        kept.status = InstanceStatus::Borrowed;
        kept.pending_counterparty = None;

        Ok(TransitionPlan {
            instance_id: self.id,
            updates: vec![kept],
            removals: vec![],
            audit: self.audit(
                tool_type,
                actor,
                AuditAction::TransferRejected,
                InstanceStatus::Borrowed,
                self.holder,
                None,
                at,
            ),
        })
    }

    /// Borrowed → ReturnPending, by the holder. Parks in the admin queue;
    /// no counterparty, any admin settles it.
    pub fn request_return(
        &self,
        tool_type: &ToolType,
        actor: &Actor,
        at: DateTime<Utc>,
    ) -> DomainResult<TransitionPlan> {
        self.ensure_type(tool_type)?;
        self.ensure_status(InstanceStatus::Borrowed, "request a return")?;
        self.ensure_holder(actor, "request a return")?;

        let mut parked = self.clone();
        parked.status = InstanceStatus::ReturnPending;

        Ok(TransitionPlan {
            instance_id: self.id,
            updates: vec![parked],
            removals: vec![],
            audit: self.audit(
                tool_type,
                actor,
                AuditAction::ReturnRequested,
                InstanceStatus::ReturnPending,
                self.holder,
                None,
                at,
            ),
        })
    }

    /// ReturnPending → Available, by an admin. Merges back into stock.
    pub fn accept_return(
        &self,
        tool_type: &ToolType,
        actor: &Actor,
        stock: Option<&ToolInstance>,
        at: DateTime<Utc>,
    ) -> DomainResult<TransitionPlan> {
        self.ensure_type(tool_type)?;
        self.ensure_status(InstanceStatus::ReturnPending, "accept a return")?;
        ensure_admin(actor, "accept returns")?;

        let (updates, removals) = self.merge_into_stock(stock)?;
        Ok(TransitionPlan {
            instance_id: self.id,
            updates,
            removals,
            audit: self.audit(
                tool_type,
                actor,
                AuditAction::ReturnAccepted,
                InstanceStatus::Available,
                self.holder,
                None,
                at,
            ),
        })
    }

    /// ReturnPending → Borrowed, by an admin declining the return.
    pub fn reject_return(
        &self,
        tool_type: &ToolType,
        actor: &Actor,
        at: DateTime<Utc>,
    ) -> DomainResult<TransitionPlan> {
        self.ensure_type(tool_type)?;
        self.ensure_status(InstanceStatus::ReturnPending, "reject a return")?;
        ensure_admin(actor, "reject returns")?;

        let mut kept = self.clone();
        kept.status = InstanceStatus::Borrowed;

        Ok(TransitionPlan {
            instance_id: self.id,
            updates: vec![kept],
            removals: vec![],
            audit: self.audit(
                tool_type,
                actor,
                AuditAction::ReturnRejected,
                InstanceStatus::Borrowed,
                self.holder,
                None,
                at,
            ),
        })
    }

    // ── guards ──────────────────────────────────────────────────────────

    fn ensure_type(&self, tool_type: &ToolType) -> DomainResult<()> {
        if self.tool_type_id != tool_type.id() {
            return Err(DomainError::validation(
                "instance does not belong to the given tool type",
            ));
        }
        Ok(())
    }

    fn ensure_status(&self, expected: InstanceStatus, event: &str) -> DomainResult<()> {
        if self.status != expected {
            return Err(DomainError::invalid_transition(format!(
                "cannot {event}: instance is {}, not {expected}",
                self.status
            )));
        }
        Ok(())
    }

    fn ensure_holder(&self, actor: &Actor, event: &str) -> DomainResult<()> {
        if self.holder != Some(actor.user_id) {
            return Err(DomainError::forbidden(format!(
                "only the current holder may {event}"
            )));
        }
        Ok(())
    }

    fn ensure_counterparty(&self, actor: &Actor, event: &str) -> DomainResult<()> {
        if self.pending_counterparty != Some(actor.user_id) {
            return Err(DomainError::forbidden(format!(
                "only the pending counterparty may {event}"
            )));
        }
        Ok(())
    }

    /// Hand the batch back: grow `stock` and drop this row, or free this
    /// row in place when the type has no stock row.
    fn merge_into_stock(
        &self,
        stock: Option<&ToolInstance>,
    ) -> DomainResult<(Vec<ToolInstance>, Vec<ToolInstanceId>)> {
        match stock {
            Some(row) => {
                if row.tool_type_id != self.tool_type_id
                    || row.status != InstanceStatus::Available
                    || row.id == self.id
                {
                    return Err(DomainError::validation(
                        "merge target must be a different available instance of the same type",
                    ));
                }
                let mut grown = row.clone();
                grown.quantity = row.quantity.checked_add(self.quantity)?;
                Ok((vec![grown], vec![self.id]))
            }
            None => {
                let mut freed = self.clone();
                freed.status = InstanceStatus::Available;
                freed.holder = None;
                freed.pending_counterparty = None;
                freed.assigned_at = None;
                Ok((vec![freed], vec![]))
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn audit(
        &self,
        tool_type: &ToolType,
        actor: &Actor,
        action: AuditAction,
        new_status: InstanceStatus,
        holder_id: Option<UserId>,
        counterparty_id: Option<UserId>,
        at: DateTime<Utc>,
    ) -> AuditRecord {
        AuditRecord {
            occurred_at: at,
            actor_id: actor.user_id,
            action,
            tool_type_id: self.tool_type_id,
            tool_name: tool_type.name().to_string(),
            instance_id: Some(self.id),
            quantity: self.quantity.get(),
            prior_status: Some(self.status),
            new_status: Some(new_status),
            holder_id,
            counterparty_id,
        }
    }
}

fn ensure_admin(actor: &Actor, event: &str) -> DomainResult<()> {
    if !actor.is_admin() {
        return Err(DomainError::forbidden(format!(
            "only administrators may {event}"
        )));
    }
    Ok(())
}
