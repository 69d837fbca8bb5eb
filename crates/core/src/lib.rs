//! `toolcrib-core` — shared domain primitives.
//!
//! Ids, quantities, and the error taxonomy every other crate speaks. Nothing
//! in here touches IO or knows about HTTP, storage, or users.

pub mod entity;
pub mod error;
pub mod id;
pub mod quantity;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{ToolInstanceId, ToolTypeId, UserId};
pub use quantity::Quantity;
