pub mod memory;
pub mod model;
pub mod service;
pub mod store;
pub mod validation;

pub use memory::InMemoryUserStore;
pub use model::{NewUser, Role, User, UserUpdate};
pub use service::UserService;
pub use store::{MongoUserStore, UserStore};
pub use validation::{FieldError, ValidationErrors};
