//! stockbrief: semantic stock-news retrieval and daily report caching.
//!
//! The pipeline ingests news articles, splits them into overlapping chunks,
//! embeds the chunks, and stores them in Postgres with pgvector. Queries are
//! answered by retrieving the nearest chunks for a ticker and re-ranking them
//! at parent-document granularity. Daily investment reports are generated by
//! an LLM backend and cached one-per-ticker-per-business-day.

pub mod chunk;
pub mod config;
pub mod context;
pub mod embed;
pub mod error;
pub mod ingest;
pub mod llm;
pub mod models;
pub mod rank;
pub mod report;
pub mod store;
pub mod time;

pub use config::Config;
pub use error::{Error, Result};
