use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::{
    auth::{JwtKeys, PasswordHasher},
    error::{UserError, UserResult},
    users::validation::{
        check_email, check_full_name, check_password, normalize_email, normalize_full_name,
        ValidationErrors,
    },
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// User document as stored in the `users` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub full_name: String,
    pub email: String,
    /// Argon2 PHC string. `None` when loaded through the default projection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Role,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

/// Registration input. `password` is plaintext.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Partial update. Only a `Some` password triggers rehashing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

impl UserUpdate {
    pub fn password(plain: impl Into<String>) -> Self {
        Self {
            password: Some(plain.into()),
            ..Self::default()
        }
    }

    pub fn changes_password(&self) -> bool {
        self.password.is_some()
    }
}

impl User {
    /// Validates, normalizes and hashes. The result has no id until it is inserted.
    pub async fn new(input: NewUser, hasher: &PasswordHasher) -> UserResult<User> {
        let full_name = normalize_full_name(&input.full_name);
        let email = normalize_email(&input.email);

        let mut errors = ValidationErrors::default();
        errors.push(check_full_name(&full_name));
        errors.push(check_email(&email));
        errors.push(check_password(&input.password));
        errors.into_result()?;

        let password = hasher.hash(&input.password).await?;
        let now = DateTime::now();
        Ok(User {
            id: None,
            full_name,
            email,
            password: Some(password),
            role: input.role.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Applies `update` in place. Nothing is changed if any field is invalid.
    pub async fn apply(&mut self, update: UserUpdate, hasher: &PasswordHasher) -> UserResult<()> {
        let full_name = update.full_name.as_deref().map(normalize_full_name);
        let email = update.email.as_deref().map(normalize_email);

        let mut errors = ValidationErrors::default();
        errors.push(full_name.as_deref().and_then(check_full_name));
        errors.push(email.as_deref().and_then(check_email));
        errors.push(update.password.as_deref().and_then(check_password));
        errors.into_result()?;

        let password = match update.password.as_deref() {
            Some(plain) => Some(hasher.hash(plain).await?),
            None => None,
        };

        if let Some(full_name) = full_name {
            self.full_name = full_name;
        }
        if let Some(email) = email {
            self.email = email;
        }
        if let Some(role) = update.role {
            self.role = role;
        }
        if password.is_some() {
            self.password = password;
        }
        Ok(())
    }

    /// `Ok(false)` for any non-matching candidate.
    pub async fn compare_password(&self, candidate: &str, hasher: &PasswordHasher) -> UserResult<bool> {
        let hash = self.password.as_deref().ok_or(UserError::PasswordNotLoaded)?;
        Ok(hasher.verify(candidate, hash).await?)
    }

    pub fn issue_token(&self, keys: &JwtKeys) -> UserResult<String> {
        let id = self.id.ok_or(UserError::NotPersisted)?;
        Ok(keys.sign(&id.to_hex(), self.role, &self.email)?)
    }

    /// The user without its password hash.
    pub fn public(&self) -> User {
        User {
            password: None,
            ..self.clone()
        }
    }
}
