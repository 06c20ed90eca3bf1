use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

pub const FULL_NAME_MIN: usize = 5;
pub const FULL_NAME_MAX: usize = 50;
pub const PASSWORD_MIN: usize = 8;

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Every field that failed, in schema order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|e| e.field)
    }

    pub(crate) fn push(&mut self, err: Option<FieldError>) {
        self.0.extend(err);
    }

    pub(crate) fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", e.field, e.message)?;
        }
        Ok(())
    }
}

pub fn normalize_full_name(raw: &str) -> String {
    raw.trim().to_string()
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(
            r"^[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z0-9](?:[a-z0-9-]*[a-z0-9])?$"
        )
        .unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Expects an already trimmed name. Length is counted in characters.
pub fn check_full_name(name: &str) -> Option<FieldError> {
    let len = name.chars().count();
    if len == 0 {
        Some(FieldError::new("fullName", "Name is required"))
    } else if len < FULL_NAME_MIN {
        Some(FieldError::new(
            "fullName",
            format!("Name must be at least {FULL_NAME_MIN} characters"),
        ))
    } else if len > FULL_NAME_MAX {
        Some(FieldError::new(
            "fullName",
            format!("Name must be at most {FULL_NAME_MAX} characters"),
        ))
    } else {
        None
    }
}

/// Expects an already normalized address.
pub fn check_email(email: &str) -> Option<FieldError> {
    if email.is_empty() {
        Some(FieldError::new("email", "Email is required"))
    } else if !is_valid_email(email) {
        Some(FieldError::new("email", "Please provide a valid email address"))
    } else {
        None
    }
}

/// Checks the plaintext, before it is hashed.
pub fn check_password(plain: &str) -> Option<FieldError> {
    let len = plain.chars().count();
    if len == 0 {
        Some(FieldError::new("password", "Password is required"))
    } else if len < PASSWORD_MIN {
        Some(FieldError::new(
            "password",
            format!("Password must be at least {PASSWORD_MIN} characters"),
        ))
    } else {
        None
    }
}
