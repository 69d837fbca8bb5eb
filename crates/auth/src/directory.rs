//! Read-only user directory.
//!
//! User records are owned by an external system; this side only looks them
//! up, for identity resolution and for rendering usernames in views. Nothing
//! here mutates a user record.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use toolcrib_core::UserId;

use crate::Role;

/// Directory entry for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
}

impl UserRecord {
    pub fn new(user_id: UserId, username: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            username: username.into(),
            role,
        }
    }
}

/// Read-only lookup of user identity and display data.
pub trait UserDirectory: Send + Sync {
    fn lookup(&self, user_id: UserId) -> Option<UserRecord>;
    fn list(&self) -> Vec<UserRecord>;

    /// Username for display; falls back to the id's string form for users
    /// the directory no longer knows.
    fn username(&self, user_id: UserId) -> String {
        self.lookup(user_id)
            .map(|u| u.username)
            .unwrap_or_else(|| user_id.to_string())
    }
}

impl<D> UserDirectory for Arc<D>
where
    D: UserDirectory + ?Sized,
{
    fn lookup(&self, user_id: UserId) -> Option<UserRecord> {
        (**self).lookup(user_id)
    }

    fn list(&self) -> Vec<UserRecord> {
        (**self).list()
    }
}

/// In-memory directory seeded by the embedding process (tests, dev server).
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<UserId, UserRecord>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: UserRecord) {
        if let Ok(mut users) = self.users.write() {
            users.insert(record.user_id, record);
        }
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn lookup(&self, user_id: UserId) -> Option<UserRecord> {
        let users = self.users.read().ok()?;
        users.get(&user_id).cloned()
    }

    fn list(&self) -> Vec<UserRecord> {
        let users = match self.users.read() {
            Ok(u) => u,
            Err(_) => return vec![],
        };
        let mut all: Vec<UserRecord> = users.values().cloned().collect();
        all.sort_by(|a, b| a.username.cmp(&b.username));
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_inserted_record() {
        let directory = InMemoryUserDirectory::new();
        let id = UserId::new();
        directory.insert(UserRecord::new(id, "alice", Role::Admin));

        let found = directory.lookup(id).unwrap();
        assert_eq!(found.username, "alice");
        assert_eq!(found.role, Role::Admin);
    }

    #[test]
    fn username_falls_back_to_id() {
        let directory = InMemoryUserDirectory::new();
        let unknown = UserId::new();
        assert_eq!(directory.username(unknown), unknown.to_string());
    }

    #[test]
    fn list_is_sorted_by_username() {
        let directory = InMemoryUserDirectory::new();
        directory.insert(UserRecord::new(UserId::new(), "carol", Role::User));
        directory.insert(UserRecord::new(UserId::new(), "bob", Role::User));

        let names: Vec<String> = directory.list().into_iter().map(|u| u.username).collect();
        assert_eq!(names, vec!["bob", "carol"]);
    }
}
