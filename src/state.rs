use std::sync::Arc;

use crate::auth::{JwtKeys, PasswordHasher};
use crate::config::AppConfig;
use crate::db::{self, Database};
use crate::users::{InMemoryUserStore, MongoUserStore, UserService};

/// Shared handles for whatever serves requests on top of this crate.
#[derive(Clone)]
pub struct AppState {
    pub db: Option<Database>,
    pub config: Arc<AppConfig>,
    pub users: UserService,
}

impl AppState {
    /// Connects, ensures indexes and wires the MongoDB-backed user service.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);
        let db = db::connect(&config.database).await?;

        let store = MongoUserStore::new(&db);
        store.ensure_indexes().await?;

        let users = UserService::new(
            Arc::new(store),
            PasswordHasher::default(),
            JwtKeys::from(&config.jwt),
        );
        Ok(Self {
            db: Some(db),
            config,
            users,
        })
    }

    /// No database; users live in memory. Meant for tests and local tooling.
    pub fn in_memory(config: AppConfig, hasher: PasswordHasher) -> Self {
        let users = UserService::new(
            Arc::new(InMemoryUserStore::new()),
            hasher,
            JwtKeys::from(&config.jwt),
        );
        Self {
            db: None,
            config: Arc::new(config),
            users,
        }
    }
}
