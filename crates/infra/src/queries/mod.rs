//! Read-side queries over the store.
//!
//! Plain synchronous reads against current rows: no derived state is kept,
//! so there is nothing to rebuild or catch up. Each query resolves the
//! display names it needs through the user directory.

pub mod inbox;
pub mod pool;
pub mod report;
pub mod views;

pub use inbox::{borrowed_by, inbox_for, pending_returns, pending_transfers};
pub use pool::{available_pool, PoolEntry};
pub use report::{audit_report, AuditQuery, AuditView};
pub use views::{instances_overview, InstanceView};
