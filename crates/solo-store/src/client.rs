//! MongoDB connection handling.
//!
//! The client is built once at startup and handed to the repositories; there
//! is no process-wide handle.

use std::time::{Duration, Instant};

use mongodb::bson::{doc, Document};
use mongodb::options::{ClientOptions, ServerApi, ServerApiVersion};
use mongodb::{Client, Collection, Database};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::metrics::observe;

// =============================================================================
// Configuration
// =============================================================================

/// Default Atlas cluster host used when only credentials are supplied.
const DEFAULT_CLUSTER: &str = "cluster0.j8csd.mongodb.net";

/// Collection names.
pub const JOBS_COLLECTION: &str = "jobs";
pub const BIDS_COLLECTION: &str = "bids";

/// Storage backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// MongoDB via the official driver
    MongoDb,
    /// Process-local storage, for tests and local development
    Memory,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::MongoDb => "mongodb",
            Backend::Memory => "memory",
        }
    }
}

/// Storage configuration.
#[derive(Clone)]
pub struct StoreConfig {
    /// Selected backend
    pub backend: Backend,
    /// Connection string (MongoDB only)
    pub uri: Option<String>,
    /// Database name
    pub database: String,
    /// Application name reported to the server
    pub app_name: String,
    /// Server selection / connect timeout
    pub connect_timeout: Duration,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The URI embeds credentials.
        f.debug_struct("StoreConfig")
            .field("backend", &self.backend)
            .field("uri", &self.uri.as_ref().map(|_| "<redacted>"))
            .field("database", &self.database)
            .field("app_name", &self.app_name)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl StoreConfig {
    /// Create config from environment variables.
    pub fn from_env() -> StoreResult<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable lookup.
    ///
    /// `MONGODB_URI` wins when set; otherwise `DB_USER` and `DB_PASS` are
    /// required and combined with `DB_CLUSTER` into an SRV connection string.
    pub fn from_vars(get: impl Fn(&str) -> Option<String>) -> StoreResult<Self> {
        let backend = match get("STORE_BACKEND").as_deref().map(str::to_lowercase).as_deref() {
            None | Some("") | Some("mongodb") | Some("mongo") => Backend::MongoDb,
            Some("memory") => Backend::Memory,
            Some(other) => {
                return Err(StoreError::config(format!("Unknown STORE_BACKEND: {}", other)));
            }
        };

        let app_name = get("DB_APP_NAME").unwrap_or_else(|| "Cluster0".to_string());
        let database = get("DB_NAME")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "soloDB".to_string());
        let connect_timeout = Duration::from_secs(
            get("DB_CONNECT_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        );

        let uri = match backend {
            Backend::Memory => None,
            Backend::MongoDb => Some(match get("MONGODB_URI").filter(|s| !s.is_empty()) {
                Some(uri) => uri,
                None => {
                    let user = require(&get, "DB_USER")?;
                    let pass = require(&get, "DB_PASS")?;
                    let cluster = get("DB_CLUSTER").unwrap_or_else(|| DEFAULT_CLUSTER.to_string());
                    format!(
                        "mongodb+srv://{}:{}@{}/?retryWrites=true&w=majority&appName={}",
                        urlencoding::encode(&user),
                        urlencoding::encode(&pass),
                        cluster,
                        urlencoding::encode(&app_name),
                    )
                }
            }),
        };

        Ok(Self {
            backend,
            uri,
            database,
            app_name,
            connect_timeout,
        })
    }
}

fn require(get: &impl Fn(&str) -> Option<String>, key: &str) -> StoreResult<String> {
    get(key)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| StoreError::config(format!("{} must be set to access MongoDB", key)))
}

// =============================================================================
// Client
// =============================================================================

/// Handle to the marketplace database.
#[derive(Clone)]
pub struct MongoClient {
    client: Client,
    database: Database,
}

impl MongoClient {
    /// Create a new client. Does not contact the server; see [`MongoClient::ping`].
    pub async fn connect(config: &StoreConfig) -> StoreResult<Self> {
        let uri = config
            .uri
            .as_deref()
            .ok_or_else(|| StoreError::config("MongoDB connection string is not configured"))?;

        let mut options = ClientOptions::parse(uri).await?;
        options.app_name = Some(config.app_name.clone());
        options.connect_timeout = Some(config.connect_timeout);
        options.server_selection_timeout = Some(config.connect_timeout);
        options.server_api = Some(
            ServerApi::builder()
                .version(ServerApiVersion::V1)
                .strict(true)
                .deprecation_errors(true)
                .build(),
        );

        let client = Client::with_options(options)?;
        let database = client.database(&config.database);

        debug!("MongoDB client created for database {}", config.database);

        Ok(Self { client, database })
    }

    /// Round-trip a `ping` command to verify connectivity.
    pub async fn ping(&self) -> StoreResult<Duration> {
        observe("ping", async {
            let start = Instant::now();
            self.client
                .database("admin")
                .run_command(doc! { "ping": 1 }, None)
                .await?;
            let elapsed = start.elapsed();
            info!(latency_ms = elapsed.as_millis() as u64, "Pinged MongoDB deployment");
            Ok(elapsed)
        })
        .await
    }

    /// The jobs collection.
    pub fn jobs(&self) -> Collection<Document> {
        self.database.collection(JOBS_COLLECTION)
    }

    /// The bids collection.
    pub fn bids(&self) -> Collection<Document> {
        self.database.collection(BIDS_COLLECTION)
    }
}
