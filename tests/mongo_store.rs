// Runs against a live MongoDB. Set MONGO_URI and run with `--ignored`.
// Each test uses its own throwaway database.

use std::sync::Arc;
use std::time::Duration;

use mongodb::bson::{doc, oid::ObjectId, Document};
use userbase::{
    auth::{JwtKeys, PasswordHasher},
    config::{DatabaseConfig, JwtConfig},
    db::{self, Database},
    users::{store::USERS_COLLECTION, MongoUserStore, NewUser, UserService, UserUpdate},
    UserError,
};

struct TestContext {
    db: Database,
    users: UserService,
}

impl TestContext {
    async fn new() -> TestContext {
        let uri = std::env::var("MONGO_URI").expect("MONGO_URI must be set for mongo tests");
        let db = db::connect(&DatabaseConfig { uri, name: None })
            .await
            .expect("connect to mongo")
            .with_database(&format!("userbase_test_{}", ObjectId::new().to_hex()));

        let store = MongoUserStore::new(&db);
        store.ensure_indexes().await.expect("ensure indexes");

        let users = UserService::new(
            Arc::new(store),
            PasswordHasher::with_params(1024, 1, 1).unwrap(),
            JwtKeys::from(&JwtConfig {
                secret: "integration-secret".into(),
                expiry: Duration::from_secs(60),
            }),
        );
        TestContext { db, users }
    }

    async fn raw(&self, id: ObjectId) -> Document {
        self.db
            .inner()
            .collection::<Document>(USERS_COLLECTION)
            .find_one(doc! { "_id": id })
            .await
            .unwrap()
            .expect("document exists")
    }

    async fn cleanup(self) {
        self.db.inner().drop().await.unwrap();
    }
}

fn sample_user(email: &str) -> NewUser {
    NewUser {
        full_name: "Test User".to_string(),
        email: email.to_string(),
        password: "integration-pass".to_string(),
        role: None,
    }
}

#[tokio::test]
#[ignore]
async fn stored_document_shape() {
    let ctx = TestContext::new().await;
    let user = ctx.users.register(sample_user(" Shape@Test.com ")).await.unwrap();
    let raw = ctx.raw(user.id.unwrap()).await;

    assert_eq!(raw.get_str("fullName").unwrap(), "Test User");
    assert_eq!(raw.get_str("email").unwrap(), "shape@test.com");
    assert_eq!(raw.get_str("role").unwrap(), "USER");
    assert!(raw.get_str("password").unwrap().starts_with("$argon2id$"));
    assert!(raw.get_datetime("createdAt").is_ok());
    assert!(raw.get_datetime("updatedAt").is_ok());

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore]
async fn unique_index_rejects_duplicate_email() {
    let ctx = TestContext::new().await;
    ctx.users.register(sample_user("dup@test.com")).await.unwrap();

    let err = ctx.users.register(sample_user("DUP@test.com ")).await.unwrap_err();
    assert!(matches!(err, UserError::DuplicateEmail));

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore]
async fn projection_hides_password_and_saves_keep_hash() {
    let ctx = TestContext::new().await;
    let id = ctx.users.register(sample_user("keep@test.com")).await.unwrap().id.unwrap();
    let before = ctx.raw(id).await.get_str("password").unwrap().to_string();

    let mut loaded = ctx.users.find_by_id(id).await.unwrap().unwrap();
    assert!(loaded.password.is_none());
    loaded.full_name = "Renamed User".into();
    ctx.users.save(&mut loaded).await.unwrap();

    ctx.users
        .update(id, UserUpdate { full_name: Some("Renamed Again".into()), ..Default::default() })
        .await
        .unwrap();

    let raw = ctx.raw(id).await;
    assert_eq!(raw.get_str("password").unwrap(), before);
    assert_eq!(raw.get_str("fullName").unwrap(), "Renamed Again");

    ctx.users.update(id, UserUpdate::password("brand-new-pass")).await.unwrap();
    assert_ne!(ctx.raw(id).await.get_str("password").unwrap(), before);
    assert!(ctx.users.login("keep@test.com", "brand-new-pass").await.unwrap().is_some());

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore]
async fn delete_is_explicit() {
    let ctx = TestContext::new().await;
    let id = ctx.users.register(sample_user("gone@test.com")).await.unwrap().id.unwrap();

    assert!(ctx.users.delete(id).await.unwrap());
    assert!(ctx.users.find_by_id(id).await.unwrap().is_none());

    ctx.cleanup().await;
}
