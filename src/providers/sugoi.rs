/*!
 * Client for the Sugoi offline translator.
 *
 * The server takes `{"content": ..., "message": "translate sentences"}` and
 * answers with the translation as a JSON string, sometimes encoded twice.
 */

use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::Provider;
use crate::errors::ProviderError;

/// Sugoi request body
#[derive(Debug, Clone, Serialize)]
pub struct SugoiRequest {
    /// Sentence to translate
    pub content: String,
    /// Command understood by the server
    pub message: String,
}

impl SugoiRequest {
    pub fn translate(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            message: "translate sentences".to_string(),
        }
    }
}

/// Raw Sugoi answer
#[derive(Debug, Clone)]
pub struct SugoiResponse {
    pub body: String,
}

/// Sugoi translator client
#[derive(Debug)]
pub struct SugoiProvider {
    endpoint: String,
    timeout_secs: u64,
    client: Client,
}

impl SugoiProvider {
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout_secs,
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
        }
    }
}

/// Decode the server's body into plain text.
///
/// The body is a JSON string literal, possibly wrapping another literal.
/// Anything that does not decode is returned with surrounding quotes trimmed.
pub fn decode_body(body: &str) -> String {
    let raw = body.trim();
    match serde_json::from_str::<String>(raw) {
        Ok(once) => serde_json::from_str::<String>(once.trim()).unwrap_or(once),
        Err(_) => raw.trim_matches('"').to_string(),
    }
}

#[async_trait]
impl Provider for SugoiProvider {
    type Request = SugoiRequest;
    type Response = SugoiResponse;

    fn name(&self) -> &str {
        "Sugoi"
    }

    fn build_request(&self, text: &str) -> Self::Request {
        SugoiRequest::translate(text)
    }

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(self.timeout_secs)
                } else {
                    ProviderError::ConnectionError(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        if !status.is_success() {
            error!("Sugoi API error ({}): {}", status, body);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: body,
            });
        }

        Ok(SugoiResponse { body })
    }

    fn extract_text(response: &Self::Response) -> String {
        decode_body(&response.body)
    }
}
