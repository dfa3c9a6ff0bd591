//! Daily report cache
//!
//! One report per ticker per business day, enforced by a unique constraint
//! on (ticker, created_at). The upsert is a single atomic statement so
//! concurrent writers for the same day cannot produce duplicates; the loser
//! overwrites the report body in place.

use crate::error::Result;
use crate::models::StockReport;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

/// Read/write access to cached daily reports.
#[async_trait]
pub trait ReportCache: Send + Sync {
    /// Look up the report for a ticker on a given business day.
    async fn get(&self, ticker: &str, date: NaiveDate) -> Result<Option<StockReport>>;

    /// Insert or overwrite the report for a ticker on a given business day.
    async fn upsert(&self, ticker: &str, date: NaiveDate, report: &str) -> Result<()>;
}

/// Postgres-backed report cache.
pub struct PgReportCache {
    pool: PgPool,
}

impl PgReportCache {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All reports for a ticker, newest first.
    pub async fn history(&self, ticker: &str) -> Result<Vec<StockReport>> {
        let reports = sqlx::query_as(
            "SELECT id, ticker, report, created_at, updated_at \
             FROM stock_reports \
             WHERE ticker = $1 \
             ORDER BY created_at DESC",
        )
        .bind(ticker)
        .fetch_all(&self.pool)
        .await?;
        Ok(reports)
    }
}

#[async_trait]
impl ReportCache for PgReportCache {
    async fn get(&self, ticker: &str, date: NaiveDate) -> Result<Option<StockReport>> {
        let report = sqlx::query_as(
            "SELECT id, ticker, report, created_at, updated_at \
             FROM stock_reports \
             WHERE ticker = $1 AND created_at = $2",
        )
        .bind(ticker)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(report)
    }

    async fn upsert(&self, ticker: &str, date: NaiveDate, report: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO stock_reports (ticker, report, created_at) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (ticker, created_at) \
             DO UPDATE SET report = EXCLUDED.report, updated_at = now()",
        )
        .bind(ticker)
        .bind(report)
        .bind(date)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
