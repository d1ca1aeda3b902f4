//! Chat-completion backends.

use crate::{AgentError, AgentResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

pub const OLLAMA_URL_ENV: &str = "OSTRICHDB_OLLAMA_URL";
pub const MODEL_ENV: &str = "OSTRICHDB_AGENT_MODEL";
pub const OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";
pub const OPENAI_BASE_URL_ENV: &str = "OPENAI_BASE_URL";

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "ostrichdb1";
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Local models can take minutes on the first prompt.
const COMPLETION_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Anything that can complete a conversation.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Short name for logs and the CLI banner.
    fn name(&self) -> &str;

    /// Reply text for the conversation so far.
    async fn complete(&self, messages: &[ChatMessage]) -> AgentResult<String>;
}

fn http_client() -> AgentResult<Client> {
    Ok(Client::builder().timeout(COMPLETION_TIMEOUT).build()?)
}

/// Join `path` onto `base`, keeping any path prefix `base` already has.
fn endpoint(base: &Url, path: &str) -> String {
    format!("{}/{}", base.as_str().trim_end_matches('/'), path)
}

async fn error_body(res: reqwest::Response) -> AgentError {
    let status = res.status();
    let body = res.text().await.unwrap_or_default();
    AgentError::Backend(format!("{}: {}", status, body))
}

/// Ollama's `/api/chat`.
#[derive(Debug, Clone)]
pub struct OllamaBackend {
    url: Url,
    model: String,
    http: Client,
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaResponse {
    message: ChatMessage,
}

impl OllamaBackend {
    pub fn new(url: Url, model: impl Into<String>) -> AgentResult<Self> {
        Ok(Self {
            url,
            model: model.into(),
            http: http_client()?,
        })
    }

    /// `OSTRICHDB_OLLAMA_URL` and `OSTRICHDB_AGENT_MODEL`, or the local defaults.
    pub fn from_env() -> AgentResult<Self> {
        let url = std::env::var(OLLAMA_URL_ENV).unwrap_or_else(|_| DEFAULT_OLLAMA_URL.to_string());
        let model = std::env::var(MODEL_ENV).unwrap_or_else(|_| DEFAULT_OLLAMA_MODEL.to_string());
        let url = Url::parse(&url)
            .map_err(|e| AgentError::Backend(format!("invalid {} {:?}: {}", OLLAMA_URL_ENV, url, e)))?;
        Self::new(url, model)
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ChatBackend for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    #[instrument(name = "agent.ollama.complete", skip_all, fields(model = %self.model), err)]
    async fn complete(&self, messages: &[ChatMessage]) -> AgentResult<String> {
        let uri = endpoint(&self.url, "api/chat");
        debug!("🦙 POST {} ({} messages)", uri, messages.len());

        let res = self
            .http
            .post(uri)
            .json(&OllamaRequest {
                model: &self.model,
                messages,
                stream: false,
            })
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(error_body(res).await);
        }

        let body: OllamaResponse = res.json().await?;
        Ok(body.message.content)
    }
}

/// Any server speaking the OpenAI `/v1/chat/completions` protocol.
#[derive(Debug, Clone)]
pub struct OpenAiBackend {
    base_url: Url,
    api_key: String,
    model: String,
    http: Client,
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: ChatMessage,
}

impl OpenAiBackend {
    pub fn new(base_url: Url, api_key: impl Into<String>, model: impl Into<String>) -> AgentResult<Self> {
        Ok(Self {
            base_url,
            api_key: api_key.into(),
            model: model.into(),
            http: http_client()?,
        })
    }

    /// Requires `OPENAI_API_KEY`; `OPENAI_BASE_URL` and
    /// `OSTRICHDB_AGENT_MODEL` are optional.
    pub fn from_env() -> AgentResult<Self> {
        let api_key = std::env::var(OPENAI_KEY_ENV)
            .map_err(|_| AgentError::Backend(format!("{} is not set", OPENAI_KEY_ENV)))?;
        let base = std::env::var(OPENAI_BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_OPENAI_URL.to_string());
        let model = std::env::var(MODEL_ENV).unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.to_string());
        let base_url = Url::parse(&base).map_err(|e| {
            AgentError::Backend(format!("invalid {} {:?}: {}", OPENAI_BASE_URL_ENV, base, e))
        })?;
        Self::new(base_url, api_key, model)
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ChatBackend for OpenAiBackend {
    fn name(&self) -> &str {
        "openai"
    }

    #[instrument(name = "agent.openai.complete", skip_all, fields(model = %self.model), err)]
    async fn complete(&self, messages: &[ChatMessage]) -> AgentResult<String> {
        let uri = endpoint(&self.base_url, "v1/chat/completions");
        debug!("🤖 POST {} ({} messages)", uri, messages.len());

        let res = self
            .http
            .post(uri)
            .bearer_auth(&self.api_key)
            .json(&OpenAiRequest {
                model: &self.model,
                messages,
            })
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(error_body(res).await);
        }

        let body: OpenAiResponse = res.json().await?;
        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AgentError::Backend("completion returned no choices".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_serialize_lowercase() {
        let json = serde_json::to_string(&ChatMessage::system("be brief")).unwrap();
        assert_eq!(json, r#"{"role":"system","content":"be brief"}"#);
    }

    #[test]
    fn endpoint_keeps_prefix() {
        let base = Url::parse("http://proxy.local/openai/").unwrap();
        assert_eq!(
            endpoint(&base, "v1/chat/completions"),
            "http://proxy.local/openai/v1/chat/completions"
        );
        let root = Url::parse("http://localhost:11434").unwrap();
        assert_eq!(endpoint(&root, "api/chat"), "http://localhost:11434/api/chat");
    }
}
