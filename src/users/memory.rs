use std::collections::HashMap;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use crate::{
    error::{UserError, UserResult},
    users::{model::User, store::UserStore},
};

/// In-process [`UserStore`] with the same uniqueness and projection rules as MongoDB.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<ObjectId, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }

    /// Raw stored document, hash included.
    pub async fn stored(&self, id: ObjectId) -> Option<User> {
        self.users.read().await.get(&id).cloned()
    }
}

fn email_taken(users: &HashMap<ObjectId, User>, email: &str, except: Option<ObjectId>) -> bool {
    users
        .values()
        .any(|u| u.email == email && u.id != except)
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: &User) -> UserResult<User> {
        let mut users = self.users.write().await;
        if email_taken(&users, &user.email, None) {
            return Err(UserError::DuplicateEmail);
        }
        let id = user.id.unwrap_or_else(ObjectId::new);
        if users.contains_key(&id) {
            return Err(UserError::DuplicateId);
        }
        let stored = User {
            id: Some(id),
            ..user.clone()
        };
        users.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, user: &User) -> UserResult<()> {
        let id = user.id.ok_or(UserError::NotPersisted)?;
        let mut users = self.users.write().await;
        if email_taken(&users, &user.email, Some(id)) {
            return Err(UserError::DuplicateEmail);
        }
        let existing = users.get_mut(&id).ok_or(UserError::NotFound)?;
        let password = user.password.clone().or_else(|| existing.password.take());
        *existing = User {
            password,
            ..user.clone()
        };
        Ok(())
    }

    async fn find_by_id(&self, id: ObjectId) -> UserResult<Option<User>> {
        Ok(self.users.read().await.get(&id).map(User::public))
    }

    async fn find_by_id_with_password(&self, id: ObjectId) -> UserResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .map(User::public))
    }

    async fn find_by_email_with_password(&self, email: &str) -> UserResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn delete(&self, id: ObjectId) -> UserResult<bool> {
        Ok(self.users.write().await.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::model::tests::{hasher, new_user};

    #[tokio::test]
    async fn reused_id_is_not_reported_as_duplicate_email() {
        let store = InMemoryUserStore::new();
        let first = User::new(new_user("ada@example.com"), &hasher()).await.unwrap();
        let stored = store.insert(&first).await.unwrap();

        let mut second = User::new(new_user("charles@example.com"), &hasher()).await.unwrap();
        second.id = stored.id;
        let err = store.insert(&second).await.unwrap_err();
        assert!(matches!(err, UserError::DuplicateId));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn taken_email_wins_over_fresh_id() {
        let store = InMemoryUserStore::new();
        let user = User::new(new_user("ada@example.com"), &hasher()).await.unwrap();
        store.insert(&user).await.unwrap();

        let err = store.insert(&user).await.unwrap_err();
        assert!(matches!(err, UserError::DuplicateEmail));
    }
}
