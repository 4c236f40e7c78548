//! Compare two Groq models on one prompt and let a third judge them.
//!
//! Run with: cargo run --example compare -- [API_KEY]
//! Without an argument the key is read from `GROQ_API_KEY` (a `.env` file works too).
use dotenv::dotenv;
use llm_compare::{
    ComparatorSettings, ComparisonOutcome, ComparisonRequest, CredentialStatus, ModelCatalog,
    ModelChoice, Session, prompt::DEFAULT_USER_PROMPT, run_comparison,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let user_key = std::env::args().nth(1);
    let mut session = Session::default();
    session.set_api_key(user_key.as_deref());

    if session.check_credential().await == CredentialStatus::Invalid {
        eprintln!("Please enter a valid GROQ API key.");
    }

    let catalog = ModelCatalog::groq();
    let mut names = catalog.display_names();
    let first = names.next().and_then(|name| ModelChoice::from_catalog(&catalog, name));
    let second = names.next().and_then(|name| ModelChoice::from_catalog(&catalog, name));
    let judge = ModelChoice::from_catalog(&catalog, "LLaMA 70B");
    let (Some(first), Some(second), Some(judge)) = (first, second, judge) else {
        return Err("model catalog is missing entries".into());
    };

    let request = ComparisonRequest::new(first, second, DEFAULT_USER_PROMPT)
        .with_comparator(ComparatorSettings::new(judge));

    let outcome = match session.client() {
        Ok(client) => run_comparison(&client, &request).await,
        Err(e) => {
            eprintln!("{e}");
            ComparisonOutcome::pending(&request)
        }
    };

    println!("{}", outcome.render());
    Ok(())
}
