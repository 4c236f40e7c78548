use crate::core::LlmError;
use crate::provider::Provider;

/// Where to take the API key from.
#[derive(Debug, Clone)]
pub enum ApiKey {
    /// The provider's environment variable, e.g. `GROQ_API_KEY`.
    Default,
    Custom(String),
}

impl ApiKey {
    pub fn resolve(self, provider: Provider) -> Result<String, LlmError> {
        match self {
            ApiKey::Custom(key) => Ok(key),
            ApiKey::Default => {
                let var = provider.default_api_key_env_var();
                std::env::var(var)
                    .ok()
                    .filter(|key| !key.trim().is_empty())
                    .ok_or_else(|| LlmError::ProviderConfiguration(format!("{var} not set.")))
            }
        }
    }
}

/// Pick the key for a session: a non-blank user-supplied key wins over the environment.
pub fn resolve_api_key(provider: Provider, user_supplied: Option<&str>) -> Option<String> {
    let env_key = ApiKey::Default.resolve(provider).ok();
    pick_api_key(user_supplied, env_key.as_deref())
}

fn pick_api_key(user_supplied: Option<&str>, env_key: Option<&str>) -> Option<String> {
    [user_supplied, env_key]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|key| !key.is_empty())
        .map(str::to_string)
}
