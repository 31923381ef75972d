use anyhow::{Context, Result};
use async_trait::async_trait;

use super::GenerativeBackend;
use crate::constants::DEFAULT_OPENROUTER_MODEL;

const OPENROUTER_API_BASE: &str = "https://openrouter.ai/api/v1";

/// OpenRouter chat-completions client
pub struct OpenRouterClient {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl OpenRouterClient {
    pub fn new(api_key: String) -> Self {
        Self::with_model(api_key, DEFAULT_OPENROUTER_MODEL.to_string())
    }

    pub fn with_model(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            client: reqwest::Client::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a single user message and return the first choice's content
    pub async fn complete(&self, prompt: &str, temperature: f32) -> Result<String> {
        let url = format!("{}/chat/completions", OPENROUTER_API_BASE);

        let body = serde_json::json!({
            "model": self.model,
            "temperature": temperature,
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ],
        });

        let response = self.client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .context("Failed to send chat completion request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenRouter chat completion error ({}): {}", status, error_text);
        }

        let response_json: serde_json::Value = response
            .json()
            .await
            .context("Failed to parse OpenRouter chat response")?;

        let content = response_json["choices"][0]["message"]["content"]
            .as_str()
            .context("Failed to extract message content from response")?
            .to_string();

        Ok(content)
    }
}

#[async_trait]
impl GenerativeBackend for OpenRouterClient {
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String> {
        self.complete(prompt, temperature).await
    }

    fn name(&self) -> &str {
        "openrouter"
    }
}
