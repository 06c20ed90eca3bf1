use mongodb::error::{ErrorKind, WriteFailure};
use thiserror::Error;

use crate::{
    auth::{HashError, TokenError},
    users::{store::EMAIL_INDEX, validation::ValidationErrors},
};

const DUPLICATE_KEY: i32 = 11000;
const ID_INDEX: &str = "_id_";

#[derive(Debug, Error)]
pub enum UserError {
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),
    #[error("This email is already registered, Sign in instead")]
    DuplicateEmail,
    #[error("a user with this id already exists")]
    DuplicateId,
    #[error("user not found")]
    NotFound,
    #[error("user has not been persisted yet")]
    NotPersisted,
    #[error("password was not selected when the user was loaded")]
    PasswordNotLoaded,

    #[error(transparent)]
    Hash(#[from] HashError),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Db(mongodb::error::Error),
    #[error(transparent)]
    Serialization(#[from] mongodb::bson::ser::Error),
}

impl From<ValidationErrors> for UserError {
    fn from(e: ValidationErrors) -> Self {
        UserError::Validation(e)
    }
}

impl From<mongodb::error::Error> for UserError {
    fn from(e: mongodb::error::Error) -> Self {
        if let Some(mapped) = duplicate_key_message(&e).and_then(from_duplicate_key) {
            return mapped;
        }
        UserError::Db(e)
    }
}

fn duplicate_key_message(e: &mongodb::error::Error) -> Option<&str> {
    match e.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(w)) if w.code == DUPLICATE_KEY => {
            Some(&w.message)
        }
        ErrorKind::Command(c) if c.code == DUPLICATE_KEY => Some(&c.message),
        _ => None,
    }
}

/// Maps an E11000 message to the index it names. Unknown indexes stay driver errors.
fn from_duplicate_key(message: &str) -> Option<UserError> {
    let index = message
        .split("index: ")
        .nth(1)?
        .split_whitespace()
        .next()?;
    match index {
        EMAIL_INDEX => Some(UserError::DuplicateEmail),
        ID_INDEX => Some(UserError::DuplicateId),
        _ => None,
    }
}

pub type UserResult<T> = Result<T, UserError>;
