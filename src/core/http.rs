//! Thin HTTP wrapper shared by provider clients.
//!
//! Every call is a single attempt. Status handling:
//! - 2xx: body is returned (or deserialized)
//! - any other status: [`LlmError::Provider`] with the status attached
//! - no status at all: [`LlmError::Transport`]

use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use super::error::LlmError;

/// Configuration for the underlying reqwest client.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Default timeout for a whole request, overridable per call
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            user_agent: format!("llm-compare/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(config: &HttpClientConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                LlmError::ProviderConfiguration(format!("Failed to build reqwest client: {e}"))
            })?;

        Ok(Self { client })
    }

    /// GET `url` and hand back the response if the status is a success.
    #[tracing::instrument(name = "http_get", skip(self, headers), fields(url = %url), err)]
    pub async fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
        timeout: Option<Duration>,
    ) -> Result<reqwest::Response, LlmError> {
        let mut req_builder = self.client.get(url);
        for (name, value) in headers {
            req_builder = req_builder.header(name, value);
        }
        if let Some(timeout) = timeout {
            req_builder = req_builder.timeout(timeout);
        }

        let res = req_builder.send().await.map_err(transport_error)?;
        ensure_success(res).await
    }

    /// POST `body` as JSON to `url` and deserialize the JSON answer.
    #[tracing::instrument(
        name = "http_post_json",
        skip(self, headers, body),
        fields(url = %url),
        err
    )]
    pub async fn post_json<Req, Res>(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &Req,
        timeout: Option<Duration>,
    ) -> Result<Res, LlmError>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        let mut req_builder = self.client.post(url).json(body);
        for (name, value) in headers {
            req_builder = req_builder.header(name, value);
        }
        if let Some(timeout) = timeout {
            req_builder = req_builder.timeout(timeout);
        }

        let res = req_builder.send().await.map_err(transport_error)?;
        let res = ensure_success(res).await?;

        let response_text = res.text().await.map_err(transport_error)?;
        serde_json::from_str(&response_text).map_err(|e| LlmError::Parse {
            message: "Failed to parse API response".to_string(),
            source: Box::new(e),
        })
    }
}

fn transport_error(e: reqwest::Error) -> LlmError {
    let message = if e.is_timeout() {
        "Request timed out".to_string()
    } else if e.is_connect() {
        "Failed to connect to provider".to_string()
    } else {
        "Request failed".to_string()
    };
    warn!(error = %e, "{message}");
    LlmError::Transport {
        message,
        source: Box::new(e),
    }
}

async fn ensure_success(res: reqwest::Response) -> Result<reqwest::Response, LlmError> {
    let status = res.status();
    if status.is_success() {
        debug!(status = %status, "HTTP request successful");
        return Ok(res);
    }

    warn!(status = %status, "API returned error status");
    let error_text = res
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    Err(LlmError::Provider {
        message: format!("{} ({})", extract_error_message(&error_text), status),
        status_code: Some(status.as_u16()),
        source: None,
    })
}

/// Pull `error.message` out of an OpenAI-style error body, falling back to the raw text.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .and_then(|error| error.get("message").or(Some(error)))
                .and_then(|message| message.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_openai_style_error_message() {
        let body = r#"{"error":{"message":"The model `nope` does not exist","type":"invalid_request_error"}}"#;
        assert_eq!(
            extract_error_message(body),
            "The model `nope` does not exist"
        );
    }

    #[test]
    fn extracts_plain_string_error() {
        assert_eq!(extract_error_message(r#"{"error":"quota"}"#), "quota");
    }

    #[test]
    fn falls_back_to_raw_body() {
        assert_eq!(extract_error_message("Bad Gateway"), "Bad Gateway");
    }
}
