//! External extraction-model client for the fallback's model-assisted tier.
//!
//! The fallback depends on the [`ModelExtractor`] trait, not on a concrete
//! client, so tests substitute deterministic stubs and never touch the
//! network. [`ApiModelExtractor`] is the production implementation; it picks
//! a provider from environment credentials and makes exactly one bounded
//! request per call. Failures demote to the heuristic tier, never retry.

use anyhow::{Context, Result, anyhow};
use ledgerlens_core::PipelineConfig;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Injected extraction capability: one prompt in, raw model text out.
pub trait ModelExtractor: Send + Sync {
    fn extract(&self, system: &str, input: &str) -> Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Anthropic,
    OpenAI,
}

#[derive(Debug, Clone)]
pub struct ApiModelExtractor {
    provider: Provider,
    model: String,
    api_key: String,
    timeout: Duration,
}

impl ApiModelExtractor {
    /// Provider selection from process environment: `ANTHROPIC_API_KEY`
    /// first, then `OPENAI_API_KEY`. `None` when neither is set, which
    /// silently disables the model tier.
    pub fn from_env(config: &PipelineConfig) -> Option<Self> {
        if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
            if !key.is_empty() {
                return Some(Self {
                    provider: Provider::Anthropic,
                    model: "claude-3-5-sonnet-latest".to_string(),
                    api_key: key,
                    timeout: config.model_timeout,
                });
            }
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.is_empty() {
                return Some(Self {
                    provider: Provider::OpenAI,
                    model: "gpt-4o-mini".to_string(),
                    api_key: key,
                    timeout: config.model_timeout,
                });
            }
        }
        None
    }

    async fn extract_async(&self, system: &str, input: &str) -> Result<String> {
        match self.provider {
            Provider::Anthropic => self.anthropic_complete(system, input).await,
            Provider::OpenAI => self.openai_complete(system, input).await,
        }
    }

    fn client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .context("build HTTP client")
    }

    async fn anthropic_complete(&self, system: &str, input: &str) -> Result<String> {
        #[derive(Serialize)]
        struct Msg {
            role: String,
            content: String,
        }

        #[derive(Serialize)]
        struct Req {
            model: String,
            max_tokens: i32,
            system: String,
            messages: Vec<Msg>,
        }

        #[derive(Deserialize)]
        struct Resp {
            content: Vec<ContentBlock>,
        }

        #[derive(Deserialize)]
        struct ContentBlock {
            text: Option<String>,
        }

        let body = Req {
            model: self.model.clone(),
            max_tokens: 1024,
            system: system.to_string(),
            messages: vec![Msg {
                role: "user".to_string(),
                content: input.to_string(),
            }],
        };

        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_str(&self.api_key)?);
        headers.insert("anthropic-version", HeaderValue::from_static("2023-06-01"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let resp: Resp = self
            .client()?
            .post("https://api.anthropic.com/v1/messages")
            .headers(headers)
            .json(&body)
            .send()
            .await
            .context("anthropic request failed")?
            .error_for_status()
            .context("anthropic returned non-success status")?
            .json()
            .await
            .context("parse anthropic response")?;

        resp.content
            .into_iter()
            .find_map(|b| b.text)
            .ok_or_else(|| anyhow!("anthropic response had no text content"))
    }

    async fn openai_complete(&self, system: &str, input: &str) -> Result<String> {
        #[derive(Serialize)]
        struct Msg {
            role: String,
            content: String,
        }

        #[derive(Serialize)]
        struct Req {
            model: String,
            messages: Vec<Msg>,
        }

        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: RespMsg,
        }

        #[derive(Deserialize)]
        struct RespMsg {
            content: Option<String>,
        }

        let body = Req {
            model: self.model.clone(),
            messages: vec![
                Msg {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                Msg {
                    role: "user".to_string(),
                    content: input.to_string(),
                },
            ],
        };

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let resp: Resp = self
            .client()?
            .post("https://api.openai.com/v1/chat/completions")
            .headers(headers)
            .json(&body)
            .send()
            .await
            .context("openai request failed")?
            .error_for_status()
            .context("openai returned non-success status")?
            .json()
            .await
            .context("parse openai response")?;

        resp.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| anyhow!("openai response had no message content"))
    }
}

impl ModelExtractor for ApiModelExtractor {
    fn extract(&self, system: &str, input: &str) -> Result<String> {
        // Callers may already be inside a tokio runtime (the preview server
        // is async); a nested runtime would panic on block_on.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            tokio::task::block_in_place(|| {
                handle.block_on(self.extract_async(system, input))
            })
        } else {
            let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
            rt.block_on(self.extract_async(system, input))
        }
    }
}
