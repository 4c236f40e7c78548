//! # llm-compare
//!
//! Send one prompt to two language models, show both answers with their usage
//! metadata, and optionally ask a third model to judge them.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use llm_compare::{
//!     ComparatorSettings, ComparisonRequest, ModelChoice, Session, run_comparison,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = Session::default();
//!     session.set_api_key(None); // falls back to GROQ_API_KEY
//!     session.check_credential().await;
//!
//!     let request = ComparisonRequest::new(
//!         ModelChoice::new("LLaMA 8B", "llama3-8b-8192"),
//!         ModelChoice::new("Gemma 2 9B IT", "gemma2-9b-it"),
//!         "Explain nucleus sampling in two sentences.",
//!     )
//!     .with_comparator(ComparatorSettings::new(ModelChoice::new(
//!         "LLaMA 70B",
//!         "llama3-70b-8192",
//!     )));
//!
//!     let outcome = run_comparison(&session.client()?, &request).await;
//!     println!("{}", outcome.render());
//!     Ok(())
//! }
//! ```
//!
//! Prompts passed to [`CompletionProvider::complete`] are brace templates; see
//! [`prompt`] for the escaping rules.

pub mod catalog;
pub mod comparison;
pub mod core;
pub mod credential;
pub mod prompt;
pub mod provider;
pub mod session;

pub use catalog::ModelCatalog;
pub use comparison::{
    ComparatorSettings, ComparisonOutcome, ComparisonRequest, ModelChoice, Panel, PanelOutcome,
    SamplingSettings, run_comparison,
};
pub use crate::core::{
    ChatRole, CompletionProvider, CompletionResult, CredentialStatus, HttpClientConfig, LlmError,
    Message, ModelParameters,
};
pub use credential::{ApiKey, resolve_api_key};
pub use provider::{GroqClient, GroqConfig, ModelInfo, Provider};
pub use session::Session;
