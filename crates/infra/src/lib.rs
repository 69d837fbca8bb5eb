//! Infrastructure layer: storage, transition orchestration, read queries.

pub mod catalog;
pub mod engine;
pub mod queries;
pub mod store;
