//! Per-user context: which key is in use and whether the provider accepted it.

use tracing::{info, warn};

use crate::core::{CompletionProvider, CredentialStatus, HttpClientConfig, LlmError};
use crate::credential::resolve_api_key;
use crate::provider::{GroqClient, GroqConfig, Provider};

#[derive(Clone)]
pub struct Session {
    provider: Provider,
    base_url: String,
    http_config: HttpClientConfig,
    api_key: Option<String>,
    status: CredentialStatus,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("has_api_key", &self.api_key.is_some())
            .field("status", &self.status)
            .finish()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Provider::Groq)
    }
}

impl Session {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            base_url: provider.default_base_url().to_string(),
            http_config: HttpClientConfig::default(),
            api_key: None,
            status: CredentialStatus::Unchecked,
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

    /// Apply the key typed by the user, falling back to the environment.
    ///
    /// The credential status goes back to `Unchecked` only if the effective key changed.
    pub fn set_api_key(&mut self, user_supplied: Option<&str>) {
        let resolved = resolve_api_key(self.provider, user_supplied);
        if resolved != self.api_key {
            self.api_key = resolved;
            self.status = CredentialStatus::Unchecked;
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn status(&self) -> CredentialStatus {
        self.status
    }

    /// Ask the provider whether the current key is accepted and remember the answer.
    ///
    /// An invalid key is only a warning: generation may still be attempted.
    pub async fn check_credential(&mut self) -> CredentialStatus {
        let outcome = match self.client() {
            Ok(client) => client.check_credential().await,
            Err(e) => Err(e),
        };

        self.status = match outcome {
            Ok(()) => {
                info!(provider = %self.provider, "API key is valid");
                CredentialStatus::Valid
            }
            Err(e) => {
                warn!(provider = %self.provider, error = %e, "API key could not be validated");
                CredentialStatus::Invalid
            }
        };
        self.status
    }

    /// Client bound to the current key.
    pub fn client(&self) -> Result<GroqClient, LlmError> {
        let api_key = self.api_key.clone().ok_or_else(|| {
            LlmError::ProviderConfiguration(format!(
                "No API key. Enter one or set {}.",
                self.provider.default_api_key_env_var()
            ))
        })?;

        let config = GroqConfig::new(api_key)
            .with_base_url(self.base_url.clone())
            .with_http_config(self.http_config.clone());
        GroqClient::new(config)
    }
}
