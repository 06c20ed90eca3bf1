use std::sync::Arc;

use mongodb::bson::{oid::ObjectId, DateTime};
use tracing::{info, instrument, warn};

use crate::{
    auth::{JwtKeys, PasswordHasher},
    error::{UserError, UserResult},
    users::{
        model::{NewUser, User, UserUpdate},
        store::UserStore,
        validation::normalize_email,
    },
};

/// Single write path for users: hashing, timestamps and persistence.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    keys: JwtKeys,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, hasher: PasswordHasher, keys: JwtKeys) -> Self {
        Self { store, hasher, keys }
    }

    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    #[instrument(skip(self, input), fields(email = %input.email.trim()))]
    pub async fn register(&self, input: NewUser) -> UserResult<User> {
        let user = User::new(input, &self.hasher).await.map_err(|e| {
            warn!(error = %e, "registration rejected");
            e
        })?;
        let user = self.store.insert(&user).await.map_err(|e| {
            warn!(error = %e, "insert user failed");
            e
        })?;
        if let Some(id) = user.id {
            info!(user_id = %id, email = %user.email, "user registered");
        }
        Ok(user)
    }

    /// Persists `user` as-is and bumps `updated_at`. Never hashes.
    #[instrument(skip(self, user), fields(user_id = ?user.id))]
    pub async fn save(&self, user: &mut User) -> UserResult<()> {
        user.updated_at = DateTime::now();
        self.store.update(user).await
    }

    #[instrument(skip(self, update), fields(password_changed = update.changes_password()))]
    pub async fn update(&self, id: ObjectId, update: UserUpdate) -> UserResult<User> {
        let mut user = self
            .store
            .find_by_id_with_password(id)
            .await?
            .ok_or(UserError::NotFound)?;
        let password_changed = update.changes_password();
        user.apply(update, &self.hasher).await?;
        self.save(&mut user).await?;
        info!(user_id = %id, password_changed, "user updated");
        Ok(user.public())
    }

    pub async fn find_by_id(&self, id: ObjectId) -> UserResult<Option<User>> {
        self.store.find_by_id(id).await
    }

    pub async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        self.store.find_by_email(&normalize_email(email)).await
    }

    /// `None` for an unknown email or a wrong password.
    #[instrument(skip(self, email, password))]
    pub async fn authenticate(&self, email: &str, password: &str) -> UserResult<Option<User>> {
        let email = normalize_email(email);
        let Some(user) = self.store.find_by_email_with_password(&email).await? else {
            warn!(email = %email, "login unknown email");
            return Ok(None);
        };
        if !user.compare_password(password, &self.hasher).await? {
            warn!(email = %email, user_id = ?user.id, "login invalid password");
            return Ok(None);
        }
        Ok(Some(user.public()))
    }

    /// Authenticates and issues a token for the user.
    pub async fn login(&self, email: &str, password: &str) -> UserResult<Option<(User, String)>> {
        let Some(user) = self.authenticate(email, password).await? else {
            return Ok(None);
        };
        let token = user.issue_token(&self.keys)?;
        info!(user_id = ?user.id, email = %user.email, "user logged in");
        Ok(Some((user, token)))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: ObjectId) -> UserResult<bool> {
        let deleted = self.store.delete(id).await?;
        if deleted {
            info!(user_id = %id, "user deleted");
        }
        Ok(deleted)
    }
}
