use async_trait::async_trait;
use std::collections::HashMap;

use crate::database::models::User;
use crate::database::DatabaseError;

/// Where token verification resolves a subject to a user record
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_user(&self, id: i32) -> Result<Option<User>, DatabaseError>;
}

/// Fixed set of users held in memory. Used by tests and tooling that
/// verify tokens without a database.
#[derive(Debug, Default, Clone)]
pub struct MemoryIdentityStore {
    users: HashMap<i32, User>,
}

impl MemoryIdentityStore {
    pub fn new(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: users.into_iter().map(|u| (u.id, u)).collect(),
        }
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn find_user(&self, id: i32) -> Result<Option<User>, DatabaseError> {
        Ok(self.users.get(&id).cloned())
    }
}
