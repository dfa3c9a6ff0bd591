//! Configuration management for stockbrief
//!
//! All settings come from environment-style key/value pairs (a `.env` file is
//! honored via dotenvy at startup). Required values fail fast; tunables fall
//! back to their defaults with a logged warning when set to something invalid.

mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use chrono_tz::Tz;
use std::fmt::Display;
use std::str::FromStr;
use tracing::warn;

/// Main configuration structure
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection URL (required)
    pub database_url: String,

    /// Chunking configuration
    pub chunk: ChunkConfig,

    /// Embedding provider configuration
    pub embedding: EmbeddingConfig,

    /// LLM report-generation configuration
    pub llm: LlmConfig,

    /// Timezone used to compute "today" for report caching
    pub business_timezone: Tz,

    /// News collection job configuration
    pub collect: CollectConfig,
}

/// Chunking configuration
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    /// Maximum characters per chunk
    pub max_chars: usize,

    /// Overlap characters carried between consecutive chunks
    pub overlap_chars: usize,
}

/// Embedding provider configuration
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    /// Provider name ("ollama"; others are not implemented)
    pub provider: String,

    /// Model name/identifier
    pub model: String,

    /// Backend base URL
    pub base_url: String,

    /// Embedding dimension (store-wide invariant, must match the model)
    pub dimension: usize,

    /// Batch size for embedding requests
    pub batch_size: usize,
}

/// LLM report-generation configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Provider name ("ollama"; others are not implemented)
    pub provider: String,

    /// Model name/identifier
    pub model: String,

    /// Backend base URL
    pub base_url: String,

    /// Caller-visible generation timeout in seconds
    pub timeout_secs: u64,

    /// Number of daily bars included in the stock CSV context
    pub stock_context_count: usize,
}

/// News collection job configuration
#[derive(Debug, Clone)]
pub struct CollectConfig {
    /// Tickers processed per news batch
    pub news_batch_size: usize,

    /// Delay between batches in seconds
    pub batch_delay_secs: f64,
}

impl Config {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key/value lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| Error::Config("DATABASE_URL is required".to_string()))?;

        let max_chars = parse_or_default(
            &lookup,
            "NEWS_CHUNK_SIZE",
            default_chunk_size(),
            |v: &usize| *v > 0,
        );
        let mut overlap_chars = parse_or_default(
            &lookup,
            "NEWS_CHUNK_OVERLAP",
            default_chunk_overlap(),
            |_: &usize| true,
        );
        if overlap_chars >= max_chars {
            let clamped = max_chars.saturating_sub(1);
            warn!(
                "NEWS_CHUNK_OVERLAP ({}) >= NEWS_CHUNK_SIZE ({}); clamping overlap to {}",
                overlap_chars, max_chars, clamped
            );
            overlap_chars = clamped;
        }

        let business_timezone = {
            let name = lookup("BUSINESS_TIMEZONE").unwrap_or_else(default_business_timezone);
            match name.parse::<Tz>() {
                Ok(tz) => tz,
                Err(_) => {
                    warn!(
                        "Invalid BUSINESS_TIMEZONE '{}'; defaulting to {}",
                        name,
                        default_business_timezone()
                    );
                    default_business_timezone()
                        .parse::<Tz>()
                        .map_err(|e| Error::Config(format!("bad default timezone: {e}")))?
                }
            }
        };

        Ok(Self {
            database_url,
            chunk: ChunkConfig {
                max_chars,
                overlap_chars,
            },
            embedding: EmbeddingConfig {
                provider: lookup("EMBEDDING_PROVIDER").unwrap_or_else(default_embedding_provider),
                model: lookup("EMBEDDING_MODEL").unwrap_or_else(default_embedding_model),
                base_url: lookup("EMBEDDING_BASE_URL").unwrap_or_else(default_embedding_base_url),
                dimension: parse_or_default(
                    &lookup,
                    "EMBEDDING_DIMENSION",
                    default_embedding_dimension(),
                    |v: &usize| *v > 0,
                ),
                batch_size: parse_or_default(
                    &lookup,
                    "EMBEDDING_BATCH_SIZE",
                    default_embedding_batch_size(),
                    |v: &usize| *v > 0,
                ),
            },
            llm: LlmConfig {
                provider: lookup("LLM_PROVIDER").unwrap_or_else(default_llm_provider),
                model: lookup("LLM_MODEL").unwrap_or_else(default_llm_model),
                base_url: lookup("LLM_BASE_URL").unwrap_or_else(default_llm_base_url),
                timeout_secs: parse_or_default(
                    &lookup,
                    "REPORT_TIMEOUT_SECS",
                    default_report_timeout_secs(),
                    |v: &u64| *v > 0,
                ),
                stock_context_count: parse_or_default(
                    &lookup,
                    "STOCK_CONTEXT_COUNT",
                    default_stock_context_count(),
                    |v: &usize| *v > 0,
                ),
            },
            business_timezone,
            collect: CollectConfig {
                news_batch_size: parse_or_default(
                    &lookup,
                    "STOCK_NEWS_BATCH_SIZE",
                    default_news_batch_size(),
                    |v: &usize| *v > 0,
                ),
                batch_delay_secs: parse_or_default(
                    &lookup,
                    "BATCH_DELAY_SECONDS",
                    default_batch_delay_secs(),
                    |v: &f64| *v >= 0.0,
                ),
            },
        })
    }
}

/// Parse a tunable from the lookup, falling back to the default with a
/// warning when the value is malformed or fails validation.
fn parse_or_default<T, F>(
    lookup: impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
    valid: F,
) -> T
where
    T: FromStr + Display,
    F: Fn(&T) -> bool,
{
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) if valid(&value) => value,
            _ => {
                warn!("Invalid {} '{}'; defaulting to {}", key, raw, default);
                default
            }
        },
    }
}
