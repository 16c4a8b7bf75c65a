//! In-memory user storage shared by both backends.

use std::collections::BTreeMap;
use std::sync::RwLock;

use clear_router::HttpError;
use serde::{Deserialize, Serialize};

/// Parses the `{id}` path parameter.
pub fn parse_id(raw: Option<&str>) -> Result<u64, HttpError> {
    raw.and_then(|id| id.parse().ok())
        .ok_or_else(|| HttpError::new(400, "id must be a positive integer"))
}

pub fn not_found(id: u64) -> HttpError {
    HttpError::new(404, format!("user {id} not found"))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
}

/// Fields accepted when creating or updating a user.
#[derive(Debug, Deserialize)]
pub struct UserInput {
    pub name: String,
    pub email: String,
}

#[derive(Debug)]
pub struct UserStore {
    users: RwLock<BTreeMap<u64, User>>,
}

impl Default for UserStore {
    fn default() -> Self {
        let store = Self {
            users: RwLock::new(BTreeMap::new()),
        };
        store.insert(UserInput {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
        });
        store
    }
}

impl UserStore {
    pub fn list(&self) -> Vec<User> {
        self.read().values().cloned().collect()
    }

    pub fn get(&self, id: u64) -> Option<User> {
        self.read().get(&id).cloned()
    }

    pub fn insert(&self, input: UserInput) -> User {
        let mut users = self.write();
        let id = users.keys().next_back().map_or(1, |last| last + 1);
        let user = User {
            id,
            name: input.name,
            email: input.email,
        };
        users.insert(id, user.clone());
        user
    }

    pub fn update(&self, id: u64, input: UserInput) -> Option<User> {
        let mut users = self.write();
        let user = users.get_mut(&id)?;
        user.name = input.name;
        user.email = input.email;
        Some(user.clone())
    }

    pub fn remove(&self, id: u64) -> Option<User> {
        self.write().remove(&id)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<u64, User>> {
        self.users.read().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<u64, User>> {
        self.users.write().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
