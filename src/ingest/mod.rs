//! News ingestion
//!
//! Articles arrive from a [`NewsFetcher`], get validated and chunked, and are
//! written through the news store. The collection job walks a ticker list in
//! batches with a delay between batches; one failing batch never aborts the
//! rest of the run.

use crate::chunk;
use crate::config::{ChunkConfig, CollectConfig};
use crate::error::Result;
use crate::models::Article;
use crate::store::{BatchOutcome, DocumentIngestor};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info, warn};
use url::Url;

/// Source of raw articles for a set of tickers.
#[async_trait]
pub trait NewsFetcher: Send + Sync {
    async fn fetch(&self, tickers: &[String]) -> Result<Vec<Article>>;
}

/// Fetcher backed by a JSON file of articles; filters by requested tickers.
pub struct JsonFileFetcher {
    articles: Vec<Article>,
}

impl JsonFileFetcher {
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let articles: Vec<Article> = serde_json::from_str(&raw)?;
        Ok(Self { articles })
    }
}

#[async_trait]
impl NewsFetcher for JsonFileFetcher {
    async fn fetch(&self, tickers: &[String]) -> Result<Vec<Article>> {
        Ok(self
            .articles
            .iter()
            .filter(|a| tickers.iter().any(|t| t == &a.ticker))
            .cloned()
            .collect())
    }
}

/// Destination for prepared articles. Seam for the collection job.
#[async_trait]
pub trait ArticleSink: Send + Sync {
    async fn ingest(&self, articles: Vec<Article>) -> Result<BatchOutcome>;
}

/// Chunks articles and writes them through the news store.
pub struct IngestPipeline {
    ingestor: DocumentIngestor,
    chunk: ChunkConfig,
}

impl IngestPipeline {
    pub fn new(ingestor: DocumentIngestor, chunk: ChunkConfig) -> Self {
        Self { ingestor, chunk }
    }
}

#[async_trait]
impl ArticleSink for IngestPipeline {
    async fn ingest(&self, articles: Vec<Article>) -> Result<BatchOutcome> {
        let items = prepare(articles, &self.chunk);
        if items.is_empty() {
            return Ok(BatchOutcome::default());
        }
        self.ingestor.insert_many(&items).await
    }
}

/// Validate and chunk articles. Articles with an invalid URL or a body that
/// chunks to nothing are dropped with a warning.
fn prepare(articles: Vec<Article>, config: &ChunkConfig) -> Vec<(Article, Vec<String>)> {
    let mut items = Vec::with_capacity(articles.len());
    for article in articles {
        if Url::parse(&article.url).is_err() {
            warn!("skipping article with invalid url: '{}'", article.url);
            continue;
        }
        let chunks = chunk::split(&article.body, config.max_chars, config.overlap_chars);
        if chunks.is_empty() {
            warn!("skipping article with empty body: {}", article.url);
            continue;
        }
        items.push((article, chunks));
    }
    items
}

/// Totals from one collection run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectStats {
    pub batches: usize,
    pub failed_batches: usize,
    pub documents: usize,
    pub chunks: usize,
    pub skipped: usize,
}

/// Fetch and ingest news for `tickers` in batches.
pub async fn collect_news(
    fetcher: &dyn NewsFetcher,
    sink: &dyn ArticleSink,
    tickers: &[String],
    config: &CollectConfig,
) -> CollectStats {
    let mut stats = CollectStats::default();
    let batch_size = config.news_batch_size.max(1);
    let batch_count = tickers.chunks(batch_size).count();

    for (index, batch) in tickers.chunks(batch_size).enumerate() {
        stats.batches += 1;
        info!(
            "collecting news batch {}/{}: {:?}",
            index + 1,
            batch_count,
            batch
        );

        let outcome = match fetcher.fetch(batch).await {
            Ok(articles) => sink.ingest(articles).await,
            Err(e) => Err(e),
        };
        match outcome {
            Ok(batch_outcome) => {
                stats.documents += batch_outcome.documents;
                stats.chunks += batch_outcome.chunks;
                stats.skipped += batch_outcome.skipped;
            }
            Err(e) => {
                stats.failed_batches += 1;
                error!("news batch {:?} failed: {}", batch, e);
            }
        }

        if index + 1 < batch_count && config.batch_delay_secs > 0.0 {
            tokio::time::sleep(Duration::from_secs_f64(config.batch_delay_secs)).await;
        }
    }

    info!(
        "collection finished: {} documents ({} chunks) across {} batches, {} duplicates, {} failed batches",
        stats.documents, stats.chunks, stats.batches, stats.skipped, stats.failed_batches
    );
    stats
}
