pub mod cohere;
pub mod openrouter;
pub mod prompts;

use anyhow::Result;
use async_trait::async_trait;

pub use cohere::CohereClient;
pub use openrouter::OpenRouterClient;

/// A text-generation service used for classification, drafting and summaries.
///
/// One call is one attempt: implementations do not retry, and failures surface
/// as errors for the caller to degrade on.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Generate a completion for `prompt` at the given sampling temperature.
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String>;

    /// Name of this backend (for logging).
    fn name(&self) -> &str;
}

/// Backend used when no provider is configured. Every call fails, so
/// classification falls through to heuristics and drafting reports why.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledBackend;

#[async_trait]
impl GenerativeBackend for DisabledBackend {
    async fn generate(&self, _prompt: &str, _temperature: f32) -> Result<String> {
        anyhow::bail!("no generative backend configured (set a provider and API key)")
    }

    fn name(&self) -> &str {
        "disabled"
    }
}
