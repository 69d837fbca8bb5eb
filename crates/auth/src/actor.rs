use serde::{Deserialize, Serialize};
use toolcrib_core::UserId;

use crate::Role;

/// A fully resolved caller identity.
///
/// Construction is decoupled from transport: the API layer resolves the
/// identity header through the user directory and hands the result to the
/// engine. The engine never sees credentials, only this.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn admin(user_id: UserId) -> Self {
        Self::new(user_id, Role::Admin)
    }

    pub fn user(user_id: UserId) -> Self {
        Self::new(user_id, Role::User)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
