//! # Document Store Gateway
//!
//! Entity-agnostic persistence over MongoDB.
//!
//! The gateway is built once at startup. Missing connection parameters or a
//! failed initial ping put it into `Degraded` mode instead of aborting the
//! process: diagnostic calls keep answering, persistence calls fail with
//! [`AppError::Persistence`].
//!
//! Store-native identifiers never leave this module. Every document returned
//! by [`DocumentStore::list`] has its `_id` replaced by a plain string `id`.

use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Bson, Document},
    options::ClientOptions,
    Client, Database,
};
use tracing::{info, instrument, warn};

use crate::{config::Config, error::AppError};

/// Cap on diagnostic strings carried in errors and the `/test` payload.
const DIAGNOSTIC_CAP: usize = 80;

/// Bounds every round trip, so diagnostics stay fast when the store is gone.
const SERVER_SELECTION_TIMEOUT: Duration = Duration::from_millis(500);

/// Connection state of the gateway, fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreStatus {
    Connected,
    Degraded(String),
}

/// Narrow capability interface over a document store: create into a named
/// collection, list a bounded number of documents back out.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts the document and returns the store-generated identifier as a
    /// string.
    async fn create(&self, collection: &str, document: Document) -> Result<String, AppError>;

    /// Returns at most `limit` documents matching the equality filter, each
    /// with its native identifier rewritten into a string `id` field.
    /// A limit of zero yields an empty list.
    async fn list(
        &self,
        collection: &str,
        filter: Document,
        limit: u32,
    ) -> Result<Vec<Document>, AppError>;

    /// Collection names, or an empty list when degraded.
    async fn collection_names(&self) -> Result<Vec<String>, AppError>;

    fn status(&self) -> StoreStatus;
}

enum Handle {
    Live(Database),
    Degraded(String),
}

/// MongoDB-backed [`DocumentStore`].
pub struct MongoStore {
    handle: Handle,
}

impl MongoStore {
    /// Connects using the environment-supplied parameters. Never fails:
    /// absent parameters or an unreachable store produce a degraded gateway.
    pub async fn init(config: &Config) -> Self {
        let (Some(url), Some(name)) = (&config.database_url, &config.database_name) else {
            warn!("Store connection parameters missing, starting degraded");
            return Self::degraded("DATABASE_URL or DATABASE_NAME not set");
        };

        match Self::connect(url, name).await {
            Ok(database) => {
                info!("Connected to store database {name}");
                Self {
                    handle: Handle::Live(database),
                }
            }
            Err(error) => {
                warn!("Store connection failed, starting degraded: {error}");
                Self::degraded(&error.to_string())
            }
        }
    }

    async fn connect(url: &str, name: &str) -> Result<Database, mongodb::error::Error> {
        let mut options = ClientOptions::parse(url).await?;
        options.server_selection_timeout = Some(SERVER_SELECTION_TIMEOUT);

        let database = Client::with_options(options)?.database(name);

        // One ping up front so a dead store degrades at startup, not on the
        // first submission.
        database.run_command(doc! { "ping": 1 }).await?;

        Ok(database)
    }

    fn degraded(reason: &str) -> Self {
        Self {
            handle: Handle::Degraded(truncate(reason)),
        }
    }

    fn live(&self) -> Result<&Database, AppError> {
        match &self.handle {
            Handle::Live(database) => Ok(database),
            Handle::Degraded(reason) => Err(AppError::Persistence(reason.clone())),
        }
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    #[instrument(skip(self, document))]
    async fn create(&self, collection: &str, document: Document) -> Result<String, AppError> {
        let result = self
            .live()?
            .collection::<Document>(collection)
            .insert_one(document)
            .await
            .map_err(persistence)?;

        Ok(render_id(&result.inserted_id))
    }

    #[instrument(skip(self, filter))]
    async fn list(
        &self,
        collection: &str,
        filter: Document,
        limit: u32,
    ) -> Result<Vec<Document>, AppError> {
        let database = self.live()?;

        // Mongo reads limit 0 as "no limit"; here it means none.
        if limit == 0 {
            return Ok(Vec::new());
        }

        let documents: Vec<Document> = database
            .collection::<Document>(collection)
            .find(filter)
            .limit(i64::from(limit))
            .await
            .map_err(persistence)?
            .try_collect()
            .await
            .map_err(persistence)?;

        Ok(documents.into_iter().map(normalize_id).collect())
    }

    async fn collection_names(&self) -> Result<Vec<String>, AppError> {
        match &self.handle {
            Handle::Live(database) => database.list_collection_names().await.map_err(persistence),
            Handle::Degraded(_) => Ok(Vec::new()),
        }
    }

    fn status(&self) -> StoreStatus {
        match &self.handle {
            Handle::Live(_) => StoreStatus::Connected,
            Handle::Degraded(reason) => StoreStatus::Degraded(reason.clone()),
        }
    }
}

/// Replaces the store-native `_id` with a plain string `id` field. Applied
/// to every document leaving the gateway.
pub fn normalize_id(mut document: Document) -> Document {
    if let Some(id) = document.remove("_id") {
        document.insert("id", render_id(&id));
    }

    document
}

fn render_id(id: &Bson) -> String {
    match id {
        Bson::ObjectId(object_id) => object_id.to_hex(),
        Bson::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn persistence(error: mongodb::error::Error) -> AppError {
    AppError::Persistence(truncate(&error.to_string()))
}

fn truncate(message: &str) -> String {
    message.chars().take(DIAGNOSTIC_CAP).collect()
}
