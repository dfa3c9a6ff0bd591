//! Domain types shared across the pipeline

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A raw news article handed to the ingestion pipeline.
///
/// Producing these (page fetching, HTML extraction) happens outside this
/// crate; see [`crate::ingest::NewsFetcher`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub ticker: String,
    pub title: String,
    pub body: String,
    pub published_at: Option<DateTime<Utc>>,
    pub url: String,
}

/// A stored parent news document. Identity is the source URL.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct NewsDocument {
    pub id: i64,
    pub ticker: String,
    pub title: String,
    pub body: String,
    pub published_at: Option<DateTime<Utc>>,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A parent document with its aggregate relevance score from a search.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredDocument {
    pub document: NewsDocument,
    pub score: f64,
}

/// Outcome of inserting one document with its chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Parent and all chunks were written
    Inserted { chunk_count: usize },
    /// A document with the same URL already exists; nothing was written
    AlreadyExists,
}

/// A cached daily stock report. Keyed by (ticker, created_at) where
/// created_at is a calendar date in the business timezone.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct StockReport {
    pub id: i64,
    pub ticker: String,
    pub report: String,
    pub created_at: NaiveDate,
    pub updated_at: DateTime<Utc>,
}

/// One daily OHLCV bar.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PriceBar {
    pub ticker: String,
    pub trade_date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}
