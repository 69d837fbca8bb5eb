//! Transition execution pipeline (application-level orchestration).
//!
//! Every lifecycle event runs the same way:
//!
//! ```text
//! request
//!   ↓
//! 1. Load the rows involved (plus their revisions)
//!   ↓
//! 2. Decide: pure domain method produces a `TransitionPlan` or an error
//!   ↓
//! 3. Commit the plan as one `WriteSet` (rows + audit, revision-guarded)
//! ```
//!
//! The engine holds no state of its own and never mutates rows in place;
//! if someone else wrote between load and commit, the revision guard fails
//! and the caller retries against fresh state. Domain rules stay in the
//! domain crate, storage guarantees stay in the store, and this module
//! only wires deciding to committing.

use chrono::Utc;

use toolcrib_auth::{Actor, AuthzError, UserDirectory};
use toolcrib_core::{DomainError, Quantity, ToolInstanceId, ToolTypeId, UserId};
use toolcrib_inventory::TransitionPlan;

use crate::store::{
    largest_available_row, InstanceWrite, InventoryStore, StoredInstance, StoredType, StoreError,
    WriteSet,
};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Target row or user does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Actor lacks the role or relationship the event requires.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Event is not legal from the row's current status.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// Requested more units than the stock row holds.
    #[error("insufficient quantity: requested {requested}, available {available}")]
    InsufficientQuantity { requested: u32, available: u32 },

    /// Someone else wrote between read and commit; safe to retry.
    #[error("concurrent modification: {0}")]
    Concurrency(String),

    /// Request payload failed validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Storage failure.
    #[error("storage failure: {0}")]
    Store(StoreError),
}

impl From<DomainError> for EngineError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => EngineError::Validation(msg),
            DomainError::Forbidden(msg) => EngineError::Forbidden(msg),
            DomainError::InvalidTransition(msg) => EngineError::InvalidTransition(msg),
            DomainError::InsufficientQuantity {
                requested,
                available,
            } => EngineError::InsufficientQuantity {
                requested,
                available,
            },
            DomainError::InvalidId(msg) => EngineError::Validation(msg),
            DomainError::NotFound(msg) => EngineError::NotFound(msg),
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Conflict(msg) => EngineError::Concurrency(msg),
            other => EngineError::Store(other),
        }
    }
}

impl From<AuthzError> for EngineError {
    fn from(value: AuthzError) -> Self {
        EngineError::Forbidden(value.to_string())
    }
}

/// Executes lifecycle events against the store.
///
/// Generic over the store and the user directory so tests can run fully
/// in memory and a real backend can be swapped in without touching domain
/// code. All role and relationship checks are enforced on this path; the
/// HTTP layer only translates errors, it never re-implements the rules.
#[derive(Debug)]
pub struct TransitionEngine<S, D> {
    store: S,
    directory: D,
}

impl<S, D> TransitionEngine<S, D> {
    pub fn new(store: S, directory: D) -> Self {
        Self { store, directory }
    }

    pub fn into_parts(self) -> (S, D) {
        (self.store, self.directory)
    }
}

impl<S, D> TransitionEngine<S, D>
where
    S: InventoryStore,
    D: UserDirectory,
{
    /// Hand `requested` units of a type to `to_user`, splitting the stock
    /// row when it holds more than requested. Returns the id of the row
    /// now waiting for the assignee's confirmation.
    pub fn assign(
        &self,
        actor: &Actor,
        tool_type_id: ToolTypeId,
        to_user: UserId,
        requested: Quantity,
    ) -> Result<ToolInstanceId, EngineError> {
        self.ensure_user(to_user)?;
        let stored_type = self.load_type(tool_type_id)?;
        let rows = self.store.instances_of_type(tool_type_id)?;
        let source =
            largest_available_row(&rows, None).ok_or(EngineError::InsufficientQuantity {
                requested: requested.get(),
                available: 0,
            })?;

        let plan = source.row.assign(
            &stored_type.row,
            actor,
            to_user,
            requested,
            ToolInstanceId::new(),
            Utc::now(),
        )?;
        self.commit_plan(vec![source], plan)
    }

    pub fn confirm_assignment(
        &self,
        actor: &Actor,
        instance_id: ToolInstanceId,
    ) -> Result<ToolInstanceId, EngineError> {
        let (source, stored_type) = self.load_instance(instance_id)?;
        let plan = source
            .row
            .confirm_assignment(&stored_type.row, actor, Utc::now())?;
        self.commit_plan(vec![source], plan)
    }

    pub fn reject_assignment(
        &self,
        actor: &Actor,
        instance_id: ToolInstanceId,
    ) -> Result<ToolInstanceId, EngineError> {
        let (source, stored_type) = self.load_instance(instance_id)?;
        let stock = self.stock_row(source.row.tool_type_id(), instance_id)?;
        let plan = source.row.reject_assignment(
            &stored_type.row,
            actor,
            stock.as_ref().map(|s| &s.row),
            Utc::now(),
        )?;
        let mut loaded = vec![source];
        loaded.extend(stock);
        self.commit_plan(loaded, plan)
    }

    pub fn request_transfer(
        &self,
        actor: &Actor,
        instance_id: ToolInstanceId,
        to_user: UserId,
    ) -> Result<ToolInstanceId, EngineError> {
        self.ensure_user(to_user)?;
        let (source, stored_type) = self.load_instance(instance_id)?;
        let plan = source
            .row
            .request_transfer(&stored_type.row, actor, to_user, Utc::now())?;
        self.commit_plan(vec![source], plan)
    }

    pub fn confirm_transfer(
        &self,
        actor: &Actor,
        instance_id: ToolInstanceId,
    ) -> Result<ToolInstanceId, EngineError> {
        let (source, stored_type) = self.load_instance(instance_id)?;
        let plan = source
            .row
            .confirm_transfer(&stored_type.row, actor, Utc::now())?;
        self.commit_plan(vec![source], plan)
    }

    pub fn reject_transfer(
        &self,
        actor: &Actor,
        instance_id: ToolInstanceId,
    ) -> Result<ToolInstanceId, EngineError> {
        let (source, stored_type) = self.load_instance(instance_id)?;
        let plan = source
            .row
            .reject_transfer(&stored_type.row, actor, Utc::now())?;
        self.commit_plan(vec![source], plan)
    }

    pub fn request_return(
        &self,
        actor: &Actor,
        instance_id: ToolInstanceId,
    ) -> Result<ToolInstanceId, EngineError> {
        let (source, stored_type) = self.load_instance(instance_id)?;
        let plan = source
            .row
            .request_return(&stored_type.row, actor, Utc::now())?;
        self.commit_plan(vec![source], plan)
    }

    pub fn accept_return(
        &self,
        actor: &Actor,
        instance_id: ToolInstanceId,
    ) -> Result<ToolInstanceId, EngineError> {
        let (source, stored_type) = self.load_instance(instance_id)?;
        let stock = self.stock_row(source.row.tool_type_id(), instance_id)?;
        let plan = source.row.accept_return(
            &stored_type.row,
            actor,
            stock.as_ref().map(|s| &s.row),
            Utc::now(),
        )?;
        let mut loaded = vec![source];
        loaded.extend(stock);
        self.commit_plan(loaded, plan)
    }

    pub fn reject_return(
        &self,
        actor: &Actor,
        instance_id: ToolInstanceId,
    ) -> Result<ToolInstanceId, EngineError> {
        let (source, stored_type) = self.load_instance(instance_id)?;
        let plan = source
            .row
            .reject_return(&stored_type.row, actor, Utc::now())?;
        self.commit_plan(vec![source], plan)
    }

    fn load_type(&self, id: ToolTypeId) -> Result<StoredType, EngineError> {
        self.store
            .tool_type(id)?
            .ok_or_else(|| EngineError::NotFound(format!("tool type {id}")))
    }

    fn load_instance(
        &self,
        id: ToolInstanceId,
    ) -> Result<(StoredInstance, StoredType), EngineError> {
        let source = self
            .store
            .instance(id)?
            .ok_or_else(|| EngineError::NotFound(format!("tool instance {id}")))?;
        let stored_type = self.load_type(source.row.tool_type_id())?;
        Ok((source, stored_type))
    }

    fn stock_row(
        &self,
        tool_type_id: ToolTypeId,
        excluding: ToolInstanceId,
    ) -> Result<Option<StoredInstance>, EngineError> {
        let rows = self.store.instances_of_type(tool_type_id)?;
        Ok(largest_available_row(&rows, Some(excluding)))
    }

    /// Translate a plan into revision-guarded writes. Updated rows that
    /// were loaded carry their loaded revision; anything else is an insert.
    fn commit_plan(
        &self,
        loaded: Vec<StoredInstance>,
        plan: TransitionPlan,
    ) -> Result<ToolInstanceId, EngineError> {
        let instance_id = plan.instance_id;
        let action = plan.audit.action;
        let actor_id = plan.audit.actor_id;

        let mut writes = WriteSet::default();
        for row in plan.updates {
            match loaded.iter().find(|l| l.row.id() == row.id()) {
                Some(l) => writes.instances.push(InstanceWrite::Update {
                    expected: l.revision,
                    row,
                }),
                None => writes.instances.push(InstanceWrite::Insert(row)),
            }
        }
        for id in plan.removals {
            let l = loaded
                .iter()
                .find(|l| l.row.id() == id)
                .ok_or_else(|| EngineError::Validation(format!(
                    "plan removes row {id} that was not loaded"
                )))?;
            writes.instances.push(InstanceWrite::Remove {
                expected: l.revision,
                id,
            });
        }
        writes.audit.push(plan.audit);

        self.store.commit(writes)?;
        tracing::info!(%actor_id, %instance_id, action = %action, "transition committed");
        Ok(instance_id)
    }

    fn ensure_user(&self, id: UserId) -> Result<(), EngineError> {
        if self.directory.lookup(id).is_none() {
            return Err(EngineError::NotFound(format!("user {id}")));
        }
        Ok(())
    }
}
