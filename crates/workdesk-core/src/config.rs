use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::ai::{CohereClient, DisabledBackend, GenerativeBackend, OpenRouterClient};
use crate::constants::DEFAULT_CONFIRMATION_TTL_SECS;
use crate::mail::{GmailSender, MailSender, OutboxSender};

pub const COHERE_API_KEY_ENV: &str = "COHERE_API_KEY";
pub const OPENROUTER_API_KEY_ENV: &str = "OPENROUTER_API_KEY";
pub const GMAIL_TOKEN_ENV: &str = "GMAIL_ACCESS_TOKEN";

/// Which text-generation service backs classification and drafting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Cohere,
    OpenRouter,
    Disabled,
}

impl std::str::FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cohere" => Ok(Self::Cohere),
            "openrouter" => Ok(Self::OpenRouter),
            "disabled" | "none" | "off" => Ok(Self::Disabled),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

/// Where outgoing mail goes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailTransport {
    /// Write `.eml` files under `<dataDir>/outbox`
    #[default]
    Outbox,
    Gmail,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Provider '{provider}' selected but {env} is not set")]
    MissingApiKey { provider: &'static str, env: &'static str },

    #[error("Gmail transport selected but GMAIL_ACCESS_TOKEN is not set")]
    MissingGmailToken,

    #[error("Unknown provider '{0}' (expected cohere, openrouter or disabled)")]
    UnknownProvider(String),
}

/// Agent configuration, loadable from a camelCase JSON file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Unset means "whichever provider has a key, else disabled"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Ask the model to classify before falling back to heuristics
    #[serde(default = "default_true")]
    pub generative_parsing: bool,

    #[serde(default = "default_confirmation_ttl")]
    pub confirmation_ttl_secs: u64,

    #[serde(default = "default_user_id")]
    pub user_id: String,

    #[serde(default)]
    pub mail: MailTransport,

    #[serde(default, skip_serializing)]
    pub cohere_api_key: Option<String>,

    #[serde(default, skip_serializing)]
    pub openrouter_api_key: Option<String>,

    #[serde(default, skip_serializing)]
    pub gmail_access_token: Option<String>,
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("workdesk"))
        .unwrap_or_else(|| PathBuf::from("workdesk_data"))
}

fn default_true() -> bool {
    true
}

fn default_confirmation_ttl() -> u64 {
    DEFAULT_CONFIRMATION_TTL_SECS
}

fn default_user_id() -> String {
    "local".to_string()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            provider: None,
            model: None,
            generative_parsing: true,
            confirmation_ttl_secs: DEFAULT_CONFIRMATION_TTL_SECS,
            user_id: default_user_id(),
            mail: MailTransport::default(),
            cohere_api_key: None,
            openrouter_api_key: None,
            gmail_access_token: None,
        }
    }
}

impl AgentConfig {
    /// Load config from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: AgentConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Load from `path` if given (defaults otherwise), then apply environment overrides.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(COHERE_API_KEY_ENV) {
            self.cohere_api_key = Some(key);
        }
        if let Some(key) = get(OPENROUTER_API_KEY_ENV) {
            self.openrouter_api_key = Some(key);
        }
        if let Some(token) = get(GMAIL_TOKEN_ENV) {
            self.gmail_access_token = Some(token);
        }
        if let Some(provider) = get("WORKDESK_PROVIDER") {
            self.provider = Some(provider.parse()?);
        }
        if let Some(model) = get("WORKDESK_MODEL") {
            self.model = Some(model);
        }
        if let Some(dir) = get("WORKDESK_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    /// The explicitly selected provider, or the first one with a key.
    pub fn effective_provider(&self) -> Provider {
        match self.provider {
            Some(provider) => provider,
            None if self.cohere_api_key.is_some() => Provider::Cohere,
            None if self.openrouter_api_key.is_some() => Provider::OpenRouter,
            None => Provider::Disabled,
        }
    }

    /// Build the generative backend. A selected provider without a key fails here,
    /// at startup, rather than on the first request.
    pub fn build_backend(&self) -> Result<Arc<dyn GenerativeBackend>, ConfigError> {
        let backend: Arc<dyn GenerativeBackend> = match self.effective_provider() {
            Provider::Cohere => {
                let key = self.cohere_api_key.clone().ok_or(ConfigError::MissingApiKey {
                    provider: "cohere",
                    env: COHERE_API_KEY_ENV,
                })?;
                match &self.model {
                    Some(model) => Arc::new(CohereClient::with_model(key, model.clone())),
                    None => Arc::new(CohereClient::new(key)),
                }
            }
            Provider::OpenRouter => {
                let key = self.openrouter_api_key.clone().ok_or(ConfigError::MissingApiKey {
                    provider: "openrouter",
                    env: OPENROUTER_API_KEY_ENV,
                })?;
                match &self.model {
                    Some(model) => Arc::new(OpenRouterClient::with_model(key, model.clone())),
                    None => Arc::new(OpenRouterClient::new(key)),
                }
            }
            Provider::Disabled => Arc::new(DisabledBackend),
        };
        Ok(backend)
    }

    pub fn build_mailer(&self) -> Result<Arc<dyn MailSender>, ConfigError> {
        let mailer: Arc<dyn MailSender> = match self.mail {
            MailTransport::Outbox => Arc::new(OutboxSender::new(self.outbox_dir())),
            MailTransport::Gmail => {
                let token = self.gmail_access_token.clone().ok_or(ConfigError::MissingGmailToken)?;
                Arc::new(GmailSender::new(token))
            }
        };
        Ok(mailer)
    }

    pub fn outbox_dir(&self) -> PathBuf {
        self.data_dir.join("outbox")
    }

    pub fn contacts_path(&self) -> PathBuf {
        self.data_dir.join("contacts.json")
    }

    pub fn events_path(&self) -> PathBuf {
        self.data_dir.join("events.json")
    }

    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join("history.jsonl")
    }

    pub fn documents_dir(&self) -> PathBuf {
        self.data_dir.join("documents")
    }
}
