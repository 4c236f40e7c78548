pub mod error;
pub mod http;
pub mod traits;
pub mod types;

pub use error::LlmError;
pub use http::{HttpClient, HttpClientConfig};
pub use traits::CompletionProvider;
pub use types::{
    ChatRole, CompletionResult, CredentialStatus, MAX_TOKENS_LIMIT, Message, ModelParameters,
    ModelParametersBuilder,
};
