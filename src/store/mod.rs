//! Postgres storage layer
//!
//! One pool is shared by the news store (documents + pgvector chunks), the
//! report cache and the price store. The schema is applied idempotently at
//! startup.

mod news;
mod prices;
mod reports;
mod schema;

pub use news::*;
pub use prices::*;
pub use reports::*;
pub use schema::*;

use crate::error::Result;
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Connect to Postgres.
pub async fn connect(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Apply the schema. Safe to run on every startup.
pub async fn ensure_schema(pool: &PgPool, dimension: usize) -> Result<()> {
    sqlx::raw_sql(&schema_sql(dimension)).execute(pool).await?;
    info!("schema ensured (embedding dimension {})", dimension);
    Ok(())
}

/// Row counts across the stores, for the status command.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StoreStats {
    pub documents: i64,
    pub chunks: i64,
    pub reports: i64,
    pub price_bars: i64,
}

pub async fn stats(pool: &PgPool) -> Result<StoreStats> {
    let documents = sqlx::query_scalar("SELECT COUNT(*) FROM news_documents")
        .fetch_one(pool)
        .await?;
    let chunks = sqlx::query_scalar("SELECT COUNT(*) FROM news_chunks")
        .fetch_one(pool)
        .await?;
    let reports = sqlx::query_scalar("SELECT COUNT(*) FROM stock_reports")
        .fetch_one(pool)
        .await?;
    let price_bars = sqlx::query_scalar("SELECT COUNT(*) FROM stock_prices")
        .fetch_one(pool)
        .await?;

    Ok(StoreStats {
        documents,
        chunks,
        reports,
        price_bars,
    })
}
