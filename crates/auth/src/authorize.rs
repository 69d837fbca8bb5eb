use thiserror::Error;

use crate::Actor;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: administrator role required")]
    AdminRequired,
}

/// Role gate for administrator-only operations.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
///
/// Holder/counterparty identity checks are not here: they depend on loaded
/// instance state and live in the transition table.
pub fn require_admin(actor: &Actor) -> Result<(), AuthzError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(AuthzError::AdminRequired)
    }
}
