use async_trait::async_trait;

use super::{
    error::LlmError,
    types::{CompletionResult, ModelParameters},
};

/// A backend that can check its credential and produce completions.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Confirm the configured key is accepted by the provider.
    async fn check_credential(&self) -> Result<(), LlmError>;

    /// Boolean form of [`CompletionProvider::check_credential`]; every failure reads as `false`.
    async fn validate(&self) -> bool {
        self.check_credential().await.is_ok()
    }

    /// One non-streamed completion. No retries.
    async fn complete(&self, params: &ModelParameters) -> Result<CompletionResult, LlmError>;
}
