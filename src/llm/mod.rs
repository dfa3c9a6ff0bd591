//! Report generation
//!
//! A [`ReportGenerator`] turns a ticker into a full report body. The Ollama
//! implementation gathers price and news context through [`ContextTools`]
//! and sends a single chat completion request. The caller-facing timeout is
//! enforced by the orchestrator, not here.

mod ollama;

pub use ollama::*;

use crate::config::LlmConfig;
use crate::context::ContextTools;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Produces a report body for a ticker.
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    async fn generate(&self, ticker: &str) -> Result<String>;
}

/// Create a report generator based on configuration.
pub fn create_generator(
    config: &LlmConfig,
    context: Arc<ContextTools>,
) -> Result<Arc<dyn ReportGenerator>> {
    match config.provider.as_str() {
        "ollama" => Ok(Arc::new(OllamaGenerator::new(config, context)?)),
        "openai" | "anthropic" => Err(Error::Config(format!(
            "llm provider '{}' is not implemented",
            config.provider
        ))),
        other => Err(Error::Config(format!("unsupported llm provider: {other}"))),
    }
}

pub(crate) const SYSTEM_PROMPT: &str = "\
You are a senior equity analyst writing a daily briefing for a retail investor. \
Use only the price history and news excerpts provided in the user message; never \
invent figures or events. Explain financial jargon in plain language the first \
time it appears. Structure the report with these sections: Summary, Price Action, \
News Highlights, Risks, and Outlook. Do not give direct buy or sell instructions. \
End with a one-line disclaimer that this is not investment advice.";

/// Assemble the user message from the retrieved context.
pub(crate) fn build_user_prompt(
    ticker: &str,
    stock_csv: Option<&str>,
    news_blocks: &[String],
) -> String {
    let mut prompt = format!("Write today's report for {ticker}.\n\n");

    match stock_csv {
        Some(csv) => {
            prompt.push_str("Recent daily price history (CSV):\n");
            prompt.push_str(csv);
        }
        None => prompt.push_str("Price history: not available.\n"),
    }

    prompt.push('\n');
    if news_blocks.is_empty() {
        prompt.push_str("Recent news: not available.\n");
    } else {
        prompt.push_str("Recent news:\n\n");
        for block in news_blocks {
            prompt.push_str(block);
            prompt.push_str("\n\n");
        }
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_includes_all_context() {
        let prompt = build_user_prompt(
            "AAPL",
            Some("date,close,open,high,low,vol\n2025-03-10,1.00,1.00,1.00,1.00,10\n"),
            &["Title: first".to_string(), "Title: second".to_string()],
        );

        assert!(prompt.contains("report for AAPL"));
        assert!(prompt.contains("date,close,open,high,low,vol"));
        assert!(prompt.contains("Title: first"));
        assert!(prompt.contains("Title: second"));
    }

    #[test]
    fn test_prompt_degrades_without_context() {
        let prompt = build_user_prompt("TSLA", None, &[]);

        assert!(prompt.contains("Price history: not available."));
        assert!(prompt.contains("Recent news: not available."));
    }
}
