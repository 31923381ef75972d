use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use super::GenerativeBackend;
use crate::constants::DEFAULT_COHERE_MODEL;

const COHERE_API_BASE: &str = "https://api.cohere.com/v1";

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    text: Option<String>,
}

/// Cohere chat API client
pub struct CohereClient {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl CohereClient {
    pub fn new(api_key: String) -> Self {
        Self::with_model(api_key, DEFAULT_COHERE_MODEL.to_string())
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

    pub async fn chat(&self, message: &str, temperature: f32) -> Result<String> {
        let url = format!("{}/chat", COHERE_API_BASE);

        let body = serde_json::json!({
            "model": self.model,
            "message": message,
            "temperature": temperature,
        });

        let response = self.client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .context("Failed to send request to Cohere chat API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Cohere chat error ({}): {}", status, error_text);
        }

        let chat: ChatResponse = response
            .json()
            .await
            .context("Failed to parse Cohere chat response")?;

        Ok(chat.text.unwrap_or_default().trim().to_string())
    }
}

#[async_trait]
impl GenerativeBackend for CohereClient {
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String> {
        self.chat(prompt, temperature).await
    }

    fn name(&self) -> &str {
        "cohere"
    }
}
