//! Default values for configuration

/// Default maximum characters per chunk
pub fn default_chunk_size() -> usize {
    1000
}

/// Default overlap characters between chunks
pub fn default_chunk_overlap() -> usize {
    200
}

/// Default embedding provider
pub fn default_embedding_provider() -> String {
    "ollama".to_string()
}

/// Default embedding model
pub fn default_embedding_model() -> String {
    "nomic-embed-text".to_string()
}

/// Default embedding backend URL (local Ollama)
pub fn default_embedding_base_url() -> String {
    "http://localhost:11434".to_string()
}

/// Default embedding dimension (nomic-embed-text)
pub fn default_embedding_dimension() -> usize {
    768
}

/// Default batch size for embedding requests
pub fn default_embedding_batch_size() -> usize {
    32
}

/// Default LLM provider
pub fn default_llm_provider() -> String {
    "ollama".to_string()
}

/// Default LLM model
pub fn default_llm_model() -> String {
    "qwen3:8b".to_string()
}

/// Default LLM backend URL (local Ollama)
pub fn default_llm_base_url() -> String {
    "http://localhost:11434".to_string()
}

/// Default report generation timeout in seconds
pub fn default_report_timeout_secs() -> u64 {
    120
}

/// Default business timezone (UTC+9)
pub fn default_business_timezone() -> String {
    "Asia/Seoul".to_string()
}

/// Default number of tickers per news collection batch
pub fn default_news_batch_size() -> usize {
    3
}

/// Default delay between collection batches in seconds
pub fn default_batch_delay_secs() -> f64 {
    2.0
}

/// Default number of daily bars in the stock CSV context
pub fn default_stock_context_count() -> usize {
    30
}

/// Default number of parent documents returned by a news search
pub fn default_search_top_k() -> usize {
    5
}

/// Default number of candidate chunks retrieved before parent aggregation
pub fn default_candidate_pool() -> usize {
    20
}
