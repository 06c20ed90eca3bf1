use mongodb::{bson::doc, options::ClientOptions, Client};
use thiserror::Error;
use tracing::{error, info};

use crate::config::DatabaseConfig;

const FALLBACK_DATABASE: &str = "test";

#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("invalid database connection string: {0}")]
    InvalidUri(#[source] mongodb::error::Error),
    #[error("could not reach database at {hosts}: {source}")]
    Unreachable {
        hosts: String,
        #[source]
        source: mongodb::error::Error,
    },
}

/// Process-wide database handle. Cloning shares the driver's connection pool.
#[derive(Clone, Debug)]
pub struct Database {
    client: Client,
    db: mongodb::Database,
}

impl Database {
    pub fn inner(&self) -> &mongodb::Database {
        &self.db
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn name(&self) -> &str {
        self.db.name()
    }

    /// Same connection, different database.
    pub fn with_database(&self, name: &str) -> Self {
        Self {
            client: self.client.clone(),
            db: self.client.database(name),
        }
    }
}

/// Opens the shared connection and pings the server so failures surface here.
pub async fn connect(cfg: &DatabaseConfig) -> Result<Database, ConnectError> {
    let options = ClientOptions::parse(cfg.uri.as_str()).await.map_err(|e| {
        error!(error = %e, "database connection string rejected");
        ConnectError::InvalidUri(e)
    })?;

    let hosts = options
        .hosts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",");
    let name = database_name(options.default_database.as_deref(), cfg.name.as_deref());

    let client = Client::with_options(options).map_err(|e| {
        error!(error = %e, "database client construction failed");
        ConnectError::InvalidUri(e)
    })?;
    let db = client.database(&name);

    if let Err(e) = db.run_command(doc! { "ping": 1 }).await {
        error!(error = %e, hosts = %hosts, "database connection failed");
        return Err(ConnectError::Unreachable { hosts, source: e });
    }

    info!(hosts = %hosts, database = %name, "Connected to {}", hosts);
    Ok(Database { client, db })
}

fn database_name(from_uri: Option<&str>, configured: Option<&str>) -> String {
    from_uri
        .or(configured)
        .unwrap_or(FALLBACK_DATABASE)
        .to_string()
}
