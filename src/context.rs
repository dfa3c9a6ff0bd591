//! Context retrieval for report generation
//!
//! Two retrieval functions with stable shapes: recent price history rendered
//! as CSV, and semantically relevant news rendered as delimited text blocks.
//! Report generators consume these; they are also usable directly.

use crate::error::Result;
use crate::models::{NewsDocument, PriceBar};
use crate::store::{NewsStore, PriceStore};
use std::sync::Arc;
use tracing::warn;

/// Retrieval functions shared by report generators.
pub struct ContextTools {
    news: Arc<NewsStore>,
    prices: Arc<PriceStore>,
}

impl ContextTools {
    pub fn new(news: Arc<NewsStore>, prices: Arc<PriceStore>) -> Self {
        Self { news, prices }
    }

    /// Recent daily bars for a ticker as a CSV string, oldest first.
    /// Returns `None` when no price history is stored.
    pub async fn stock_context(&self, ticker: &str, count: usize) -> Result<Option<String>> {
        let bars = self.prices.latest(ticker, count).await?;
        if bars.is_empty() {
            warn!("no price history for {}", ticker);
            return Ok(None);
        }
        Ok(Some(bars_to_csv(&bars)))
    }

    /// Relevant news for a ticker as formatted text blocks, best match first.
    pub async fn news_context(
        &self,
        ticker: &str,
        query: &str,
        top_k: usize,
        candidate_pool: usize,
    ) -> Result<Vec<String>> {
        let results = self.news.search(ticker, query, top_k, candidate_pool).await?;
        Ok(results
            .iter()
            .map(|scored| format_news_block(&scored.document))
            .collect())
    }
}

/// Render bars as CSV with a fixed header and two-decimal prices.
fn bars_to_csv(bars: &[PriceBar]) -> String {
    let mut out = String::from("date,close,open,high,low,vol\n");
    for bar in bars {
        out.push_str(&format!(
            "{},{:.2},{:.2},{:.2},{:.2},{}\n",
            bar.trade_date.format("%Y-%m-%d"),
            bar.close,
            bar.open,
            bar.high,
            bar.low,
            bar.volume
        ));
    }
    out
}

/// Render one news document as a delimited context block.
fn format_news_block(document: &NewsDocument) -> String {
    let divider = "-".repeat(100);
    let published = document
        .published_at
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "unknown".to_string());
    format!(
        "Title: {}\nPublished at: {}\nFull content: \n{}\n{}\n{}",
        document.title, published, divider, document.body, divider
    )
}
