//! Groq provider, speaking the OpenAI-compatible chat completions API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::core::{
    ChatRole, CompletionProvider, CompletionResult, HttpClient, HttpClientConfig, LlmError,
    Message, ModelParameters,
};
use crate::prompt::PromptTemplate;
use crate::provider::constants::groq;

pub struct GroqConfig {
    pub api_key: String,
    pub base_url: String,
    pub http_config: HttpClientConfig,
}

impl GroqConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: groq::API_BASE.to_string(),
            http_config: HttpClientConfig::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_http_config(mut self, config: HttpClientConfig) -> Self {
        self.http_config = config;
        self
    }

    fn auth_header(&self) -> (String, String) {
        (
            "Authorization".to_string(),
            format!("Bearer {}", self.api_key),
        )
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), endpoint)
    }
}

impl std::fmt::Debug for GroqConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroqConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("http_config", &self.http_config)
            .finish()
    }
}

pub struct GroqClient {
    config: GroqConfig,
    http: HttpClient,
}

impl GroqClient {
    pub fn new(config: GroqConfig) -> Result<Self, LlmError> {
        let http = HttpClient::new(&config.http_config)?;
        Ok(Self { config, http })
    }

    /// Models visible to the configured key.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError> {
        let res = self
            .http
            .get(
                &self.config.url(groq::MODELS_ENDPOINT),
                &[self.config.auth_header()],
                None,
            )
            .await?;

        let listing: ModelList = res.json().await.map_err(|e| LlmError::Parse {
            message: "Failed to parse model listing".to_string(),
            source: Box::new(e),
        })?;

        debug!(count = listing.data.len(), "Retrieved models");
        Ok(listing.data)
    }
}

#[async_trait]
impl CompletionProvider for GroqClient {
    async fn check_credential(&self) -> Result<(), LlmError> {
        let result = self
            .http
            .get(
                &self.config.url(groq::MODELS_ENDPOINT),
                &[self.config.auth_header()],
                None,
            )
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(LlmError::Provider {
                status_code: Some(status_code @ (401 | 403)),
                ..
            }) => Err(LlmError::CredentialInvalid { status_code }),
            Err(e) => Err(e),
        }
    }

    #[tracing::instrument(name = "groq_complete", skip(self, params), fields(model = %params.model()), err)]
    async fn complete(&self, params: &ModelParameters) -> Result<CompletionResult, LlmError> {
        let request = ChatCompletionRequest::from_params(params)?;

        let envelope: ResponseEnvelope = self
            .http
            .post_json(
                &self.config.url(groq::CHAT_COMPLETIONS_ENDPOINT),
                &[self.config.auth_header()],
                &request,
                params.timeout(),
            )
            .await?;

        envelope.into_result()
    }
}

/// Check `api_key` against the public Groq model listing.
pub async fn validate(api_key: &str) -> bool {
    validate_with(GroqConfig::new(api_key)).await
}

/// [`validate`] against an explicit endpoint and HTTP configuration.
pub async fn validate_with(config: GroqConfig) -> bool {
    match GroqClient::new(config) {
        Ok(client) => client.validate().await,
        Err(_) => false,
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    #[serde(default)]
    pub owned_by: Option<String>,
    #[serde(default)]
    pub context_window: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    data: Vec<ModelInfo>,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
    stream: bool,
}

impl ChatCompletionRequest {
    fn from_params(params: &ModelParameters) -> Result<Self, LlmError> {
        let system = PromptTemplate::new(params.system_prompt()).render(&[])?;
        let user = PromptTemplate::new(params.user_prompt()).render(&[])?;

        Ok(Self {
            model: params.model().to_string(),
            messages: vec![
                Message {
                    role: ChatRole::System,
                    content: system,
                },
                Message {
                    role: ChatRole::User,
                    content: user,
                },
            ],
            temperature: params.temperature(),
            top_p: params.top_p(),
            max_tokens: params.max_tokens(),
            stream: false,
        })
    }
}

/// The two body shapes accepted from the generation endpoint.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ResponseEnvelope {
    Chat(ChatCompletionResponse),
    Normalized(CompletionResult),
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Value>,
    #[serde(default)]
    system_fingerprint: Option<String>,
    #[serde(default)]
    x_groq: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
    #[serde(default)]
    logprobs: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ResponseEnvelope {
    fn into_result(self) -> Result<CompletionResult, LlmError> {
        match self {
            ResponseEnvelope::Normalized(result) => Ok(result),
            ResponseEnvelope::Chat(response) => response.into_result(),
        }
    }
}

impl ChatCompletionResponse {
    fn into_result(self) -> Result<CompletionResult, LlmError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Provider {
                message: "No choices in API response".to_string(),
                status_code: None,
                source: None,
            })?;

        let mut metadata = Map::new();
        if let Some(usage) = self.usage {
            metadata.insert("token_usage".to_string(), usage);
        }
        if let Some(model) = self.model {
            metadata.insert("model_name".to_string(), Value::String(model));
        }
        if let Some(fingerprint) = self.system_fingerprint {
            metadata.insert("system_fingerprint".to_string(), Value::String(fingerprint));
        }
        if let Some(reason) = choice.finish_reason {
            metadata.insert("finish_reason".to_string(), Value::String(reason));
        }
        if let Some(logprobs) = choice.logprobs {
            metadata.insert("logprobs".to_string(), logprobs);
        }
        if let Some(x_groq) = self.x_groq {
            metadata.insert("x_groq".to_string(), x_groq);
        }

        Ok(CompletionResult {
            content: choice.message.content.unwrap_or_default(),
            response_metadata: metadata,
        })
    }
}
