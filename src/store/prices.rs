//! Daily OHLCV bar storage

use crate::error::Result;
use crate::models::PriceBar;
use sqlx::PgPool;

/// Postgres-backed store for daily price bars.
pub struct PriceStore {
    pool: PgPool,
}

impl PriceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert bars, skipping (ticker, trade_date) pairs that already exist.
    /// Returns the number of rows written.
    pub async fn insert_bars(&self, bars: &[PriceBar]) -> Result<u64> {
        let mut written = 0u64;
        for bar in bars {
            let result = sqlx::query(
                "INSERT INTO stock_prices (ticker, trade_date, open, high, low, close, volume) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) \
                 ON CONFLICT (ticker, trade_date) DO NOTHING",
            )
            .bind(&bar.ticker)
            .bind(bar.trade_date)
            .bind(bar.open)
            .bind(bar.high)
            .bind(bar.low)
            .bind(bar.close)
            .bind(bar.volume)
            .execute(&self.pool)
            .await?;
            written += result.rows_affected();
        }
        Ok(written)
    }

    /// The most recent `count` bars for a ticker, oldest first.
    pub async fn latest(&self, ticker: &str, count: usize) -> Result<Vec<PriceBar>> {
        let mut bars: Vec<PriceBar> = sqlx::query_as(
            "SELECT ticker, trade_date, open, high, low, close, volume \
             FROM stock_prices \
             WHERE ticker = $1 \
             ORDER BY trade_date DESC \
             LIMIT $2",
        )
        .bind(ticker)
        .bind(count as i64)
        .fetch_all(&self.pool)
        .await?;
        bars.reverse();
        Ok(bars)
    }
}
