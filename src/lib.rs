//! User accounts on top of MongoDB: connection bootstrap, the user document,
//! password hashing and signed token issuance.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod state;
pub mod users;

pub use error::{UserError, UserResult};
