/*!
 * Provider implementations for the translation backends.
 *
 * This module contains client implementations for:
 * - Sugoi: local offline translator with a bare content/message endpoint
 * - Chat: any OpenAI-compatible chat completion server (LM Studio, llama.cpp, ...)
 * - Mock: scripted provider used by tests
 */

use async_trait::async_trait;
use log::{debug, info, warn};
use std::fmt::Debug;
use std::time::Duration;

use crate::errors::ProviderError;

/// Sentence sent by the readiness probe
pub const PROBE_SENTENCE: &str = "こんにちは、世界！";

/// Common trait for all backend clients
///
/// Each provider speaks its own request/response shape; the blanket
/// [`Translator`] implementation turns any of them into the single
/// text-in/text-out capability the pipeline needs.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// The request type for this provider
    type Request: Send + Sync;

    /// The response type for this provider
    type Response: Send + Sync;

    /// Short name used in logs
    fn name(&self) -> &str;

    /// Build the request carrying one prepared sentence
    fn build_request(&self, text: &str) -> Self::Request;

    /// Complete a request using this provider
    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError>;

    /// Extract the translated text from the provider response
    fn extract_text(response: &Self::Response) -> String;
}

/// Text-in/text-out translation capability
#[async_trait]
pub trait Translator: Send + Sync + Debug {
    fn name(&self) -> &str;

    async fn translate(&self, text: &str) -> Result<String, ProviderError>;
}

#[async_trait]
impl<P: Provider> Translator for P {
    fn name(&self) -> &str {
        Provider::name(self)
    }

    async fn translate(&self, text: &str) -> Result<String, ProviderError> {
        let request = self.build_request(text);
        let response = self.complete(request).await?;
        Ok(P::extract_text(&response))
    }
}

/// Check whether a backend answers the probe sentence in time with a
/// non-empty translation.
pub async fn is_ready(translator: &dyn Translator, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, translator.translate(PROBE_SENTENCE)).await {
        Ok(Ok(text)) if !text.trim().is_empty() => {
            info!("{} translator is ready", translator.name());
            true
        }
        Ok(Ok(_)) => {
            warn!("{} answered the readiness probe with an empty translation", translator.name());
            false
        }
        Ok(Err(e)) => {
            debug!("{} is not reachable: {}", translator.name(), e);
            false
        }
        Err(_) => {
            warn!("{} can be reached but does not answer", translator.name());
            false
        }
    }
}

/// Probe every candidate in order and keep the first ready one
pub async fn select_ready(
    candidates: Vec<Box<dyn Translator>>,
    timeout: Duration,
) -> Option<Box<dyn Translator>> {
    for candidate in candidates {
        if is_ready(candidate.as_ref(), timeout).await {
            return Some(candidate);
        }
    }
    warn!("Translation servers are offline, missing sentences won't be translated");
    None
}

pub mod chat;
pub mod mock;
pub mod sugoi;
