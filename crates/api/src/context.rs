use toolcrib_auth::{Actor, Role};
use toolcrib_core::UserId;

/// Resolved identity for a request.
///
/// Inserted by the identity middleware; present on every route under
/// `/api`, so handlers can extract it without re-checking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorContext {
    user_id: UserId,
    username: String,
    role: Role,
}

impl ActorContext {
    pub fn new(user_id: UserId, username: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            username: username.into(),
            role,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// The domain-side view of this identity.
    pub fn actor(&self) -> Actor {
        Actor::new(self.user_id, self.role)
    }
}
