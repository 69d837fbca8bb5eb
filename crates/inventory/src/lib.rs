//! `toolcrib-inventory` — the tool lifecycle domain.
//!
//! Pure decision logic: given the loaded rows and the acting user, every
//! transition either returns a [`TransitionPlan`] describing the rows to
//! write and the audit record to append, or a domain error. No IO happens
//! here; committing a plan is the store's job.

pub mod audit;
pub mod instance;
pub mod tool_type;

pub use audit::{AuditAction, AuditRecord};
pub use instance::{InstanceStatus, ToolInstance, TransitionPlan};
pub use tool_type::ToolType;
