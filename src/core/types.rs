use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::LlmError;
use crate::prompt::DEFAULT_SYSTEM_PROMPT;

/// Upper bound accepted for `max_tokens`.
pub const MAX_TOKENS_LIMIT: u32 = 32_768;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: ChatRole,
    pub content: String,
}

/// Everything needed for a single completion call.
///
/// `system_prompt` and `user_prompt` are prompt templates: braces are
/// placeholder delimiters and literal braces must be doubled. Use
/// [`crate::prompt::escape_braces`] on raw text before handing it over.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParameters {
    model: String,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
    system_prompt: String,
    user_prompt: String,
    timeout: Option<Duration>,
}

impl ModelParameters {
    pub fn builder(model: impl Into<String>) -> ModelParametersBuilder {
        ModelParametersBuilder::new(model)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn top_p(&self) -> f32 {
        self.top_p
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn user_prompt(&self) -> &str {
        &self.user_prompt
    }

    /// Per-call timeout overriding the client-wide one.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

#[derive(Debug, Clone)]
pub struct ModelParametersBuilder {
    model: String,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
    system_prompt: String,
    user_prompt: String,
    timeout: Option<Duration>,
}

impl ModelParametersBuilder {
    fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: 0.5,
            top_p: 0.9,
            max_tokens: 512,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            user_prompt: String::new(),
            timeout: None,
        }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn user_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.user_prompt = prompt.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<ModelParameters, LlmError> {
        if self.model.trim().is_empty() {
            return Err(LlmError::InvalidParameter(
                "Missing model. Make sure to specify a model identifier.".to_string(),
            ));
        }
        check_unit_interval("temperature", self.temperature)?;
        check_unit_interval("top_p", self.top_p)?;
        if self.max_tokens == 0 || self.max_tokens > MAX_TOKENS_LIMIT {
            return Err(LlmError::InvalidParameter(format!(
                "max_tokens must be between 1 and {MAX_TOKENS_LIMIT}, got {}",
                self.max_tokens
            )));
        }

        Ok(ModelParameters {
            model: self.model,
            temperature: self.temperature,
            top_p: self.top_p,
            max_tokens: self.max_tokens,
            system_prompt: self.system_prompt,
            user_prompt: self.user_prompt,
            timeout: self.timeout,
        })
    }
}

fn check_unit_interval(name: &str, value: f32) -> Result<(), LlmError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(LlmError::InvalidParameter(format!(
            "{name} must be within [0, 1], got {value}"
        )))
    }
}

/// Generated text plus whatever usage data the provider reported.
///
/// `response_metadata` is passed through as received; its keys are the
/// provider's, not ours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResult {
    pub content: String,
    #[serde(default)]
    pub response_metadata: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialStatus {
    #[default]
    Unchecked,
    Valid,
    Invalid,
}
