use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum LlmError {
    /// The model-listing endpoint refused the API key.
    #[error("Credential rejected by provider (status {status_code})")]
    CredentialInvalid { status_code: u16 },

    /// The provider answered, but not with a usable completion.
    #[error("Provider error: {message}")]
    Provider {
        message: String,
        status_code: Option<u16>,
        #[source]
        source: Option<BoxError>,
    },

    /// The request never produced an HTTP status.
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: BoxError,
    },

    #[error("Templating error: {0}")]
    Templating(String),

    #[error("Parse error: {message}")]
    Parse {
        message: String,
        #[source]
        source: BoxError,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Provider configuration error: {0}")]
    ProviderConfiguration(String),
}

impl LlmError {
    /// HTTP status attached to the error, if the provider sent one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            LlmError::CredentialInvalid { status_code } => Some(*status_code),
            LlmError::Provider { status_code, .. } => *status_code,
            _ => None,
        }
    }
}
