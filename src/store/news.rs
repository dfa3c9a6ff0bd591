//! News document and chunk storage
//!
//! Parent articles live in `news_documents`, their embedded chunks in
//! `news_chunks`. Identity is the source URL: re-ingesting a known URL is a
//! no-op. Embedding happens in [`DocumentIngestor`] before any row is
//! written, so a parent row only ever exists together with its chunk rows;
//! the transactional write sits behind [`DocumentWriter`].

use crate::embed::{embed_in_batches, Embedder};
use crate::error::{Error, Result};
use crate::models::{Article, InsertOutcome, NewsDocument, ScoredDocument};
use crate::rank::{rank_parents, ChunkHit};
use async_trait::async_trait;
use pgvector::Vector;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info};

/// A chunk with its embedding, ready to be written.
#[derive(Debug, Clone)]
pub struct EmbeddedChunk {
    pub content: String,
    pub embedding: Vec<f32>,
}

/// Transactional sink for one parent document and its chunks.
#[async_trait]
pub trait DocumentWriter: Send + Sync {
    /// Write the parent and all chunks atomically. A document with the same
    /// URL already present means nothing is written at all.
    async fn write_document(
        &self,
        article: &Article,
        chunks: &[EmbeddedChunk],
    ) -> Result<InsertOutcome>;
}

/// Counts from a batch insert. Failures are isolated per document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub documents: usize,
    pub chunks: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchOutcome {
    /// Total rows written (parents plus chunks).
    pub fn rows_affected(&self) -> usize {
        self.documents + self.chunks
    }
}

/// Embeds chunk texts and hands them to a [`DocumentWriter`].
pub struct DocumentIngestor {
    embedder: Arc<dyn Embedder>,
    writer: Arc<dyn DocumentWriter>,
    batch_size: usize,
}

impl DocumentIngestor {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        writer: Arc<dyn DocumentWriter>,
        batch_size: usize,
    ) -> Self {
        Self {
            embedder,
            writer,
            batch_size,
        }
    }

    /// Insert one article with its pre-chunked texts.
    ///
    /// Embeds every chunk before the writer is touched: an embedding failure
    /// or a dimension mismatch leaves no partial parent behind.
    pub async fn insert_document(
        &self,
        article: &Article,
        chunk_texts: &[String],
    ) -> Result<InsertOutcome> {
        if chunk_texts.is_empty() {
            return Err(Error::Ingest(format!(
                "article '{}' produced no chunks",
                article.url
            )));
        }

        let embeddings =
            embed_in_batches(self.embedder.as_ref(), chunk_texts, self.batch_size).await?;
        for embedding in &embeddings {
            check_dimension(self.embedder.dimension(), embedding)?;
        }

        let chunks: Vec<EmbeddedChunk> = chunk_texts
            .iter()
            .zip(embeddings)
            .map(|(content, embedding)| EmbeddedChunk {
                content: content.clone(),
                embedding,
            })
            .collect();

        self.writer.write_document(article, &chunks).await
    }

    /// Insert a batch of articles, isolating failures per document.
    ///
    /// Returns aggregate counts; errors only when every document in a
    /// non-empty batch failed.
    pub async fn insert_many(&self, items: &[(Article, Vec<String>)]) -> Result<BatchOutcome> {
        let mut outcome = BatchOutcome::default();

        for (article, chunks) in items {
            match self.insert_document(article, chunks).await {
                Ok(InsertOutcome::Inserted { chunk_count }) => {
                    outcome.documents += 1;
                    outcome.chunks += chunk_count;
                }
                Ok(InsertOutcome::AlreadyExists) => outcome.skipped += 1,
                Err(e) => {
                    outcome.failed += 1;
                    error!("failed to insert article '{}': {}", article.url, e);
                }
            }
        }

        if !items.is_empty() && outcome.failed == items.len() {
            return Err(Error::Ingest(format!(
                "all {} articles in batch failed",
                items.len()
            )));
        }

        info!(
            "batch insert: {} documents ({} chunks), {} duplicates skipped, {} failed",
            outcome.documents, outcome.chunks, outcome.skipped, outcome.failed
        );
        Ok(outcome)
    }
}

/// Vector-backed store for news articles.
pub struct NewsStore {
    pool: PgPool,
    embedder: Arc<dyn Embedder>,
}

impl NewsStore {
    pub fn new(pool: PgPool, embedder: Arc<dyn Embedder>) -> Self {
        Self { pool, embedder }
    }

    pub fn dimension(&self) -> usize {
        self.embedder.dimension()
    }

    /// Semantic search over one ticker's news.
    ///
    /// Retrieves the `candidate_pool` nearest chunks by cosine distance, then
    /// aggregates chunk scores to parent documents and returns the `top_k`
    /// parents, best first.
    pub async fn search(
        &self,
        ticker: &str,
        query: &str,
        top_k: usize,
        candidate_pool: usize,
    ) -> Result<Vec<ScoredDocument>> {
        let query_embedding = self.embedder.embed_query(query).await?;
        check_dimension(self.dimension(), &query_embedding)?;
        let query_vector = Vector::from(query_embedding);

        let rows: Vec<(i64, f64)> = sqlx::query_as(
            "SELECT document_id, (embedding <=> $1)::float8 AS distance \
             FROM news_chunks \
             WHERE ticker = $2 \
             ORDER BY embedding <=> $1 \
             LIMIT $3",
        )
        .bind(&query_vector)
        .bind(ticker)
        .bind(candidate_pool as i64)
        .fetch_all(&self.pool)
        .await?;

        let hits: Vec<ChunkHit> = rows
            .into_iter()
            .map(|(document_id, distance)| ChunkHit {
                document_id,
                distance,
            })
            .collect();

        let ranked = rank_parents(&hits, top_k);
        if ranked.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = ranked.iter().map(|p| p.document_id).collect();
        let documents: Vec<NewsDocument> = sqlx::query_as(
            "SELECT id, ticker, title, body, published_at, url, created_at, updated_at \
             FROM news_documents \
             WHERE id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_id: HashMap<i64, NewsDocument> =
            documents.into_iter().map(|d| (d.id, d)).collect();

        Ok(ranked
            .into_iter()
            .filter_map(|parent| {
                by_id.remove(&parent.document_id).map(|document| ScoredDocument {
                    document,
                    score: parent.score,
                })
            })
            .collect())
    }

    /// Delete a document by URL. Chunks cascade.
    pub async fn delete_document(&self, url: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM news_documents WHERE url = $1")
            .bind(url)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl DocumentWriter for NewsStore {
    async fn write_document(
        &self,
        article: &Article,
        chunks: &[EmbeddedChunk],
    ) -> Result<InsertOutcome> {
        let mut tx = self.pool.begin().await?;

        let document_id: Option<i64> = sqlx::query_scalar(
            "INSERT INTO news_documents (ticker, title, body, published_at, url) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (url) DO NOTHING \
             RETURNING id",
        )
        .bind(&article.ticker)
        .bind(&article.title)
        .bind(&article.body)
        .bind(article.published_at)
        .bind(&article.url)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(document_id) = document_id else {
            tx.rollback().await?;
            debug!("skipping duplicate article: {}", article.url);
            return Ok(InsertOutcome::AlreadyExists);
        };

        for chunk in chunks {
            sqlx::query(
                "INSERT INTO news_chunks (document_id, ticker, content, embedding) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(document_id)
            .bind(&article.ticker)
            .bind(&chunk.content)
            .bind(Vector::from(chunk.embedding.clone()))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!(
            "inserted document {} with {} chunks ({})",
            document_id,
            chunks.len(),
            article.url
        );
        Ok(InsertOutcome::Inserted {
            chunk_count: chunks.len(),
        })
    }
}

/// Reject a vector whose dimension does not match the store's.
fn check_dimension(expected: usize, vector: &[f32]) -> Result<()> {
    if vector.len() != expected {
        return Err(Error::DimensionMismatch {
            expected,
            got: vector.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Returns fixed-size vectors; texts containing "boom" fail to embed.
    struct StubEmbedder {
        dimension: usize,
        vector_len: usize,
    }

    impl StubEmbedder {
        fn new(dimension: usize) -> Self {
            Self {
                dimension,
                vector_len: dimension,
            }
        }
    }

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
            let mut vectors = self.embed_documents(&[text.to_string()]).await?;
            Ok(vectors.pop().unwrap())
        }

        async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            if texts.iter().any(|t| t.contains("boom")) {
                return Err(Error::Embedding("backend refused input".to_string()));
            }
            Ok(vec![vec![0.25; self.vector_len]; texts.len()])
        }

        fn dimension(&self) -> usize {
            self.dimension
        }

        fn model_name(&self) -> &str {
            "stub"
        }
    }

    /// In-memory writer with the same URL-conflict semantics as the store.
    struct MemoryWriter {
        documents: Mutex<HashMap<String, Vec<String>>>,
    }

    impl MemoryWriter {
        fn new() -> Self {
            Self {
                documents: Mutex::new(HashMap::new()),
            }
        }

        fn chunks_for(&self, url: &str) -> Option<Vec<String>> {
            self.documents.lock().unwrap().get(url).cloned()
        }

        fn is_empty(&self) -> bool {
            self.documents.lock().unwrap().is_empty()
        }
    }

    #[async_trait]
    impl DocumentWriter for MemoryWriter {
        async fn write_document(
            &self,
            article: &Article,
            chunks: &[EmbeddedChunk],
        ) -> Result<InsertOutcome> {
            let mut documents = self.documents.lock().unwrap();
            if documents.contains_key(&article.url) {
                return Ok(InsertOutcome::AlreadyExists);
            }
            documents.insert(
                article.url.clone(),
                chunks.iter().map(|c| c.content.clone()).collect(),
            );
            Ok(InsertOutcome::Inserted {
                chunk_count: chunks.len(),
            })
        }
    }

    fn article(url: &str, body: &str) -> Article {
        Article {
            ticker: "AAPL".to_string(),
            title: "headline".to_string(),
            body: body.to_string(),
            published_at: None,
            url: url.to_string(),
        }
    }

    fn ingestor(embedder: StubEmbedder, writer: Arc<MemoryWriter>) -> DocumentIngestor {
        DocumentIngestor::new(Arc::new(embedder), writer, 32)
    }

    fn chunks(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[tokio::test]
    async fn test_duplicate_url_leaves_original_chunks() {
        let writer = Arc::new(MemoryWriter::new());
        let ingestor = ingestor(StubEmbedder::new(3), writer.clone());
        let url = "https://example.com/a";

        let first = ingestor
            .insert_document(&article(url, "v1"), &chunks(&["c1", "c2"]))
            .await
            .unwrap();
        assert_eq!(first, InsertOutcome::Inserted { chunk_count: 2 });

        // Same URL with a different body is a no-op, not an update.
        let second = ingestor
            .insert_document(&article(url, "v2"), &chunks(&["other"]))
            .await
            .unwrap();
        assert_eq!(second, InsertOutcome::AlreadyExists);
        assert_eq!(
            writer.chunks_for(url).unwrap(),
            vec!["c1".to_string(), "c2".to_string()]
        );
    }

    #[tokio::test]
    async fn test_embedding_failure_writes_nothing() {
        let writer = Arc::new(MemoryWriter::new());
        let ingestor = ingestor(StubEmbedder::new(3), writer.clone());

        let result = ingestor
            .insert_document(&article("https://example.com/b", "x"), &chunks(&["boom"]))
            .await;

        assert!(matches!(result, Err(Error::Embedding(_))));
        assert!(writer.is_empty());
    }

    #[tokio::test]
    async fn test_dimension_mismatch_writes_nothing() {
        let writer = Arc::new(MemoryWriter::new());
        let embedder = StubEmbedder {
            dimension: 768,
            vector_len: 3,
        };
        let ingestor = ingestor(embedder, writer.clone());

        let result = ingestor
            .insert_document(&article("https://example.com/c", "x"), &chunks(&["c1"]))
            .await;

        assert!(matches!(
            result,
            Err(Error::DimensionMismatch {
                expected: 768,
                got: 3
            })
        ));
        assert!(writer.is_empty());
    }

    #[tokio::test]
    async fn test_empty_chunks_rejected() {
        let writer = Arc::new(MemoryWriter::new());
        let ingestor = ingestor(StubEmbedder::new(3), writer.clone());

        let result = ingestor
            .insert_document(&article("https://example.com/d", "x"), &[])
            .await;

        assert!(matches!(result, Err(Error::Ingest(_))));
        assert!(writer.is_empty());
    }

    #[tokio::test]
    async fn test_insert_many_isolates_failures() {
        let writer = Arc::new(MemoryWriter::new());
        let ingestor = ingestor(StubEmbedder::new(3), writer.clone());
        let items = vec![
            (article("https://example.com/good", "x"), chunks(&["c1"])),
            (article("https://example.com/bad", "x"), chunks(&["boom"])),
        ];

        let outcome = ingestor.insert_many(&items).await.unwrap();

        assert_eq!(outcome.documents, 1);
        assert_eq!(outcome.chunks, 1);
        assert_eq!(outcome.failed, 1);
        assert!(writer.chunks_for("https://example.com/good").is_some());
    }

    #[tokio::test]
    async fn test_insert_many_all_failed_errors() {
        let writer = Arc::new(MemoryWriter::new());
        let ingestor = ingestor(StubEmbedder::new(3), writer.clone());
        let items = vec![
            (article("https://example.com/b1", "x"), chunks(&["boom"])),
            (article("https://example.com/b2", "x"), chunks(&["boom 2"])),
        ];

        let result = ingestor.insert_many(&items).await;
        assert!(matches!(result, Err(Error::Ingest(_))));
    }

    #[test]
    fn test_check_dimension() {
        assert!(check_dimension(3, &[0.1, 0.2, 0.3]).is_ok());
        assert!(matches!(
            check_dimension(768, &[0.1, 0.2]),
            Err(Error::DimensionMismatch {
                expected: 768,
                got: 2
            })
        ));
    }

    #[test]
    fn test_batch_outcome_rows() {
        let outcome = BatchOutcome {
            documents: 2,
            chunks: 9,
            skipped: 1,
            failed: 0,
        };
        assert_eq!(outcome.rows_affected(), 11);
    }
}
