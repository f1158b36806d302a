use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::http_client::HttpClientTrait;
use crate::domain::generation::FinishReason;
use crate::domain::{DomainError, GenerationProvider, GenerationSample, SamplingConfig};

pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

const PROVIDER_NAME: &str = "openrouter";
const REFERER: &str = "https://github.com/llm-dynamics/llm-dynamics";
const TITLE: &str = "LLM Controlled Dynamics";

/// OpenRouter chat-completions backend
#[derive(Debug)]
pub struct OpenRouterProvider<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
}

impl<C: HttpClientTrait> OpenRouterProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_OPENROUTER_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let auth_header = format!("Bearer {}", api_key.into());
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            auth_header,
            base_url,
        }
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_request(
        &self,
        model: &str,
        prompt: &str,
        config: &SamplingConfig,
    ) -> serde_json::Value {
        serde_json::json!({
            "model": model,
            "messages": [{"role": "user", "content": prompt}],
            "max_tokens": config.max_tokens,
            "temperature": config.temperature,
            "top_p": config.top_p,
            "frequency_penalty": config.frequency_penalty,
            "presence_penalty": config.presence_penalty,
        })
    }

    fn headers(&self) -> [(&str, &str); 4] {
        [
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
            ("HTTP-Referer", REFERER),
            ("X-Title", TITLE),
        ]
    }

    fn parse_response(
        &self,
        model: &str,
        response: serde_json::Value,
    ) -> Result<GenerationSample, DomainError> {
        let response: OpenRouterResponse = serde_json::from_value(response).map_err(|e| {
            DomainError::generation(PROVIDER_NAME, format!("Failed to parse response: {}", e))
        })?;

        let choice = response.choices.into_iter().next().ok_or_else(|| {
            DomainError::generation(PROVIDER_NAME, "Response contained no choices")
        })?;

        let mut sample = GenerationSample::from_text(choice.message.content.unwrap_or_default())
            .with_model(response.model.unwrap_or_else(|| model.to_string()));

        if let Some(reason) = choice.finish_reason.as_deref() {
            sample = sample.with_finish_reason(parse_finish_reason(reason));
        }

        if let Some(total) = response.usage.and_then(|u| u.total_tokens) {
            sample = sample.with_total_tokens(total);
        }

        Ok(sample)
    }
}

#[async_trait]
impl<C: HttpClientTrait + 'static> GenerationProvider for OpenRouterProvider<C> {
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        config: &SamplingConfig,
    ) -> Result<GenerationSample, DomainError> {
        let url = self.chat_completions_url();
        let body = self.build_request(model, prompt, config);

        let response = self
            .client
            .post_json(&url, &self.headers(), &body)
            .await
            .map_err(|e| e.into_generation(PROVIDER_NAME))?;

        self.parse_response(model, response)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

fn parse_finish_reason(reason: &str) -> FinishReason {
    match reason {
        "stop" => FinishReason::Stop,
        "length" => FinishReason::Length,
        "content_filter" => FinishReason::ContentFilter,
        "tool_calls" | "function_call" => FinishReason::ToolCalls,
        "error" => FinishReason::Error,
        other => {
            debug!(reason = other, "Unrecognized finish reason");
            FinishReason::Other
        }
    }
}

// OpenRouter API types

#[derive(Debug, Deserialize)]
struct OpenRouterResponse {
    model: Option<String>,
    choices: Vec<OpenRouterChoice>,
    usage: Option<OpenRouterUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenRouterChoice {
    message: OpenRouterMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenRouterMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenRouterUsage {
    total_tokens: Option<u32>,
}
