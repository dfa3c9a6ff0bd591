//! Ollama chat backend for report generation

use super::{build_user_prompt, ReportGenerator, SYSTEM_PROMPT};
use crate::config::{default_candidate_pool, default_search_top_k, LlmConfig};
use crate::context::ContextTools;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Thin client over the Ollama chat API.
pub struct OllamaChat {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaChat {
    pub fn new(base_url: &str, model: &str) -> Result<Self> {
        // No request timeout here: the orchestrator owns the caller-facing
        // deadline and chat completions routinely run for minutes.
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    pub async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let url = format!("{}/api/chat", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&ChatRequest {
                model: &self.model,
                messages: vec![
                    ChatMessage {
                        role: "system",
                        content: system,
                    },
                    ChatMessage {
                        role: "user",
                        content: user,
                    },
                ],
                stream: false,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Generation(format!(
                "chat backend returned {status}: {body}"
            )));
        }

        let parsed: ChatResponse = response.json().await?;
        if parsed.message.content.trim().is_empty() {
            return Err(Error::Generation("chat backend returned an empty report".to_string()));
        }
        Ok(parsed.message.content)
    }
}

/// Report generator that retrieves context itself and asks Ollama once.
pub struct OllamaGenerator {
    chat: OllamaChat,
    context: Arc<ContextTools>,
    stock_context_count: usize,
}

impl OllamaGenerator {
    pub fn new(config: &LlmConfig, context: Arc<ContextTools>) -> Result<Self> {
        Ok(Self {
            chat: OllamaChat::new(&config.base_url, &config.model)?,
            context,
            stock_context_count: config.stock_context_count,
        })
    }
}

#[async_trait]
impl ReportGenerator for OllamaGenerator {
    async fn generate(&self, ticker: &str) -> Result<String> {
        // Context retrieval degrades rather than failing the report: a
        // missing price table or an unreachable vector search still leaves
        // the other half of the context usable.
        let stock_csv = match self
            .context
            .stock_context(ticker, self.stock_context_count)
            .await
        {
            Ok(csv) => csv,
            Err(e) => {
                warn!("price context unavailable for {}: {}", ticker, e);
                None
            }
        };

        let query = format!("{ticker} stock outlook and recent developments");
        let news_blocks = match self
            .context
            .news_context(ticker, &query, default_search_top_k(), default_candidate_pool())
            .await
        {
            Ok(blocks) => blocks,
            Err(e) => {
                warn!("news context unavailable for {}: {}", ticker, e);
                Vec::new()
            }
        };

        debug!(
            "generating report for {} ({} news blocks, prices: {})",
            ticker,
            news_blocks.len(),
            stock_csv.is_some()
        );

        let user = build_user_prompt(ticker, stock_csv.as_deref(), &news_blocks);
        self.chat.complete(SYSTEM_PROMPT, &user).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_complete_returns_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(json!({"model": "qwen3:8b", "stream": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": {"role": "assistant", "content": "## Summary\nQuiet day."}
            })))
            .mount(&server)
            .await;

        let chat = OllamaChat::new(&server.uri(), "qwen3:8b").unwrap();
        let report = chat.complete("system", "user").await.unwrap();
        assert!(report.contains("Quiet day."));
    }

    #[tokio::test]
    async fn test_backend_error_surfaces() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
            .mount(&server)
            .await;

        let chat = OllamaChat::new(&server.uri(), "qwen3:8b").unwrap();
        let result = chat.complete("system", "user").await;
        assert!(matches!(result, Err(Error::Generation(_))));
    }

    #[tokio::test]
    async fn test_empty_report_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": {"role": "assistant", "content": "   "}
            })))
            .mount(&server)
            .await;

        let chat = OllamaChat::new(&server.uri(), "qwen3:8b").unwrap();
        let result = chat.complete("system", "user").await;
        assert!(matches!(result, Err(Error::Generation(_))));
    }
}
