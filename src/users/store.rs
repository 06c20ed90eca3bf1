use async_trait::async_trait;
use mongodb::{
    bson::{doc, oid::ObjectId, to_document, Document},
    options::IndexOptions,
    Collection, IndexModel,
};
use tracing::info;

use crate::{
    db::Database,
    error::{UserError, UserResult},
    users::model::User,
};

pub const USERS_COLLECTION: &str = "users";
pub const EMAIL_INDEX: &str = "email_unique";

/// Persistence for [`User`]. Reads without `_with_password` never return the hash.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new user and returns it with its assigned id.
    async fn insert(&self, user: &User) -> UserResult<User>;
    /// Writes every field of `user`. A `None` password leaves the stored hash alone.
    async fn update(&self, user: &User) -> UserResult<()>;
    async fn find_by_id(&self, id: ObjectId) -> UserResult<Option<User>>;
    async fn find_by_id_with_password(&self, id: ObjectId) -> UserResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>>;
    async fn find_by_email_with_password(&self, email: &str) -> UserResult<Option<User>>;
    async fn delete(&self, id: ObjectId) -> UserResult<bool>;
}

#[derive(Clone)]
pub struct MongoUserStore {
    users: Collection<User>,
}

fn without_password() -> Document {
    doc! { "password": 0 }
}

impl MongoUserStore {
    pub fn new(db: &Database) -> Self {
        Self {
            users: db.inner().collection(USERS_COLLECTION),
        }
    }

    /// Unique index backing the email constraint.
    pub async fn ensure_indexes(&self) -> UserResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name(EMAIL_INDEX.to_string())
                    .build(),
            )
            .build();
        self.users.create_index(index).await.map_err(UserError::Db)?;
        info!(collection = USERS_COLLECTION, "user indexes ensured");
        Ok(())
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn insert(&self, user: &User) -> UserResult<User> {
        let res = self.users.insert_one(user).await?;
        let id = res.inserted_id.as_object_id().ok_or(UserError::NotPersisted)?;
        Ok(User {
            id: Some(id),
            ..user.clone()
        })
    }

    async fn update(&self, user: &User) -> UserResult<()> {
        let id = user.id.ok_or(UserError::NotPersisted)?;
        let mut fields = to_document(user)?;
        fields.remove("_id");

        let res = self
            .users
            .update_one(doc! { "_id": id }, doc! { "$set": fields })
            .await?;
        if res.matched_count == 0 {
            return Err(UserError::NotFound);
        }
        Ok(())
    }

    async fn find_by_id(&self, id: ObjectId) -> UserResult<Option<User>> {
        Ok(self
            .users
            .find_one(doc! { "_id": id })
            .projection(without_password())
            .await?)
    }

    async fn find_by_id_with_password(&self, id: ObjectId) -> UserResult<Option<User>> {
        Ok(self.users.find_one(doc! { "_id": id }).await?)
    }

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        Ok(self
            .users
            .find_one(doc! { "email": email })
            .projection(without_password())
            .await?)
    }

    async fn find_by_email_with_password(&self, email: &str) -> UserResult<Option<User>> {
        Ok(self.users.find_one(doc! { "email": email }).await?)
    }

    async fn delete(&self, id: ObjectId) -> UserResult<bool> {
        let res = self.users.delete_one(doc! { "_id": id }).await?;
        Ok(res.deleted_count > 0)
    }
}
