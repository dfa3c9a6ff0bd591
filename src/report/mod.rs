//! Daily report orchestration
//!
//! At most one report exists per ticker per business day, and at most one
//! generation runs per ticker at a time in this process. The flow is
//! check-cache, acquire the per-ticker lock, re-check, generate under a
//! timeout, persist, return. Concurrent callers for the same ticker all
//! receive the same body; other tickers are never blocked.

use crate::error::{Error, Result};
use crate::llm::ReportGenerator;
use crate::store::ReportCache;
use crate::time;
use chrono_tz::Tz;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

/// Serves cached daily reports, generating on miss.
pub struct ReportService {
    cache: Arc<dyn ReportCache>,
    generator: Arc<dyn ReportGenerator>,
    business_timezone: Tz,
    timeout_secs: u64,
    // Per-ticker generation locks, created lazily. Never evicted: the ticker
    // universe is small and each entry is a few dozen bytes.
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ReportService {
    pub fn new(
        cache: Arc<dyn ReportCache>,
        generator: Arc<dyn ReportGenerator>,
        business_timezone: Tz,
        timeout_secs: u64,
    ) -> Self {
        Self {
            cache,
            generator,
            business_timezone,
            timeout_secs,
            locks: Mutex::new(HashMap::new()),
        }
    }

    async fn ticker_lock(&self, ticker: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(ticker.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Today's report for a ticker, generated if not yet cached.
    pub async fn generate_report(&self, ticker: &str) -> Result<String> {
        let today = time::today_in(self.business_timezone);

        // Fast path: no lock needed to serve a hit.
        if let Some(report) = self.cache.get(ticker, today).await? {
            debug!("cache hit for {} on {}", ticker, today);
            return Ok(report.report);
        }

        let lock = self.ticker_lock(ticker).await;
        let _guard = lock.lock().await;

        // Another caller may have generated while we waited for the lock.
        if let Some(report) = self.cache.get(ticker, today).await? {
            debug!("cache hit for {} on {} after lock", ticker, today);
            return Ok(report.report);
        }

        info!("no cached report for {} on {}; generating", ticker, today);
        let body = tokio::time::timeout(
            Duration::from_secs(self.timeout_secs),
            self.generator.generate(ticker),
        )
        .await
        .map_err(|_| Error::GenerationTimeout(self.timeout_secs))??;

        // The report was already paid for; a failed write costs a regenerate
        // on the next call but must not cost this caller the body.
        if let Err(e) = self.cache.upsert(ticker, today, &body).await {
            error!("failed to persist report for {}: {}", ticker, e);
        }

        Ok(body)
    }

    /// Today's report if cached, without triggering generation.
    pub async fn cached_report(&self, ticker: &str) -> Result<Option<String>> {
        let today = time::today_in(self.business_timezone);
        Ok(self
            .cache
            .get(ticker, today)
            .await?
            .map(|report| report.report))
    }
}
