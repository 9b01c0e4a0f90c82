pub mod postgres;
pub mod prediction;
pub mod schema;
pub mod supabase;

use std::sync::Arc;

use async_trait::async_trait;
use interfaces_supabase_rest::index::InsertRowsError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::{config::StoreConfig, model::Popularity};

pub use postgres::PgStore;
pub use supabase::SupabaseStore;

pub type PgPool = r2d2::Pool<diesel::r2d2::ConnectionManager<diesel::PgConnection>>;

/// One row of the `popularity_classifier` table, keyed by column name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPrediction {
    pub title: String,
    pub chapters: u64,
    pub words: u64,
    pub kudos: u64,
    pub bookmarks: u64,
    pub hits: u64,
    pub comments: u64,
    pub popularity: Popularity,
}

/// The stored row as echoed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InsertedRecord {
    pub title: String,
    pub chapters: u64,
    pub words: u64,
    pub kudos: u64,
    pub bookmarks: u64,
    pub hits: u64,
    pub comments: u64,
    pub popularity: Popularity,
}

impl From<NewPrediction> for InsertedRecord {
    fn from(row: NewPrediction) -> Self {
        Self {
            title: row.title,
            chapters: row.chapters,
            words: row.words,
            kudos: row.kudos,
            bookmarks: row.bookmarks,
            hits: row.hits,
            comments: row.comments,
            popularity: row.popularity,
        }
    }
}

/// Insert-only sink for prediction rows. Every call writes a new row.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert(&self, record: &NewPrediction) -> Result<InsertedRecord, InsertPredictionError>;
}

#[derive(Debug, Error)]
pub enum InsertPredictionError {
    #[error("InsertRows: {source}")]
    InsertRows {
        #[from]
        source: InsertRowsError,
    },

    #[error("Rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("GetConnectionFromPool: {source}")]
    GetConnectionFromPool {
        #[from]
        source: r2d2::Error,
    },

    #[error("InsertPredictionRow: {source}")]
    InsertPredictionRow {
        #[from]
        source: prediction::queries::InsertPredictionRowError,
    },

    #[error("UnknownPopularity: {value:?}")]
    UnknownPopularity { value: String },

    #[error("CountOutOfRange: {field}")]
    CountOutOfRange { field: &'static str },

    #[error("BlockingTask: {source}")]
    BlockingTask {
        #[from]
        source: tokio::task::JoinError,
    },
}

/// Builds the configured store, or `None` when no database is reachable.
///
/// A missing store is reported per request rather than stopping the service.
pub fn open_store(config: &StoreConfig, client: reqwest::Client) -> Option<Arc<dyn RecordStore>> {
    match config {
        StoreConfig::Postgres { database_url } => match PgStore::connect(database_url) {
            Ok(store) => {
                info!("Persisting predictions through Postgres");
                Some(Arc::new(store))
            }
            Err(err) => {
                warn!(error = %err, "Could not build Postgres pool");
                None
            }
        },
        StoreConfig::Supabase { url, key, table } => {
            info!(table = %table, "Persisting predictions through Supabase REST");
            Some(Arc::new(SupabaseStore::new(client, url, key, table)))
        }
        StoreConfig::Missing => {
            warn!("SUPABASE_URL/SUPABASE_KEY not set; predictions cannot be stored");
            None
        }
    }
}
