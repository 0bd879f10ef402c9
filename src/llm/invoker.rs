// src/llm/invoker.rs
//! Ordered provider fallback chain for structured generation

use serde_json::Value;
use tracing::{debug, warn};

use super::provider::{ChatProvider, GenerationRequest, ProviderError};

/// Tries an ordered sequence of (provider, credential) pairs for a single
/// logical request. The first success wins; later providers are never
/// invoked. A rate-limited failure advances to the next pair, any other
/// failure is terminal for the call.
pub struct GenerativeInvoker {
    providers: Vec<Box<dyn ChatProvider>>,
}

impl GenerativeInvoker {
    /// The primary provider is mandatory; fallbacks are optional.
    pub fn new(primary: Box<dyn ChatProvider>) -> Self {
        Self {
            providers: vec![primary],
        }
    }

    pub fn with_fallback(mut self, provider: Box<dyn ChatProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Walk the chain and return the parsed structured result, or the error
    /// that ended the walk. Callers whose failures isolate per posting use
    /// this directly.
    pub async fn invoke(&self, request: &GenerationRequest) -> Result<Value, ProviderError> {
        let last = self.providers.len().saturating_sub(1);

        for (index, provider) in self.providers.iter().enumerate() {
            let outcome = match provider.chat(request).await {
                Ok(raw) => parse_structured(&raw),
                Err(err) => Err(err),
            };

            match outcome {
                Ok(value) => {
                    debug!(provider = provider.name(), "generative call succeeded");
                    return Ok(value);
                }
                Err(ProviderError::RateLimited) if index < last => {
                    warn!(
                        provider = provider.name(),
                        "rate limited, trying next provider"
                    );
                }
                Err(err) => return Err(err),
            }
        }

        Err(ProviderError::Unavailable(
            "no generative providers configured".to_string(),
        ))
    }

    /// Degrading variant: on any terminal failure, return the caller-supplied
    /// default payload with the failure recorded under `tailoring_notes`
    /// instead of propagating an error.
    pub async fn generate_json(&self, request: &GenerationRequest, fallback: Value) -> Value {
        match self.invoke(request).await {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, "generative providers exhausted, degrading to fallback payload");
                annotate_fallback(fallback, &err)
            }
        }
    }
}

fn annotate_fallback(mut fallback: Value, err: &ProviderError) -> Value {
    if let Value::Object(map) = &mut fallback {
        map.insert(
            "tailoring_notes".to_string(),
            Value::String(format!("Tailoring failed: {}", err)),
        );
    }
    fallback
}

/// Locate the first fenced code block and parse its inner content as JSON;
/// without a fence, the raw text itself must parse.
fn parse_structured(raw: &str) -> Result<Value, ProviderError> {
    let candidate = match extract_fenced_block(raw) {
        Some(inner) => inner,
        None => raw.trim().to_string(),
    };

    serde_json::from_str(&candidate)
        .map_err(|e| ProviderError::MalformedOutput(format!("invalid JSON payload: {}", e)))
}

fn extract_fenced_block(raw: &str) -> Option<String> {
    let start = raw.find("```")?;
    let mut inner = &raw[start + 3..];
    if let Some(rest) = inner.strip_prefix("json") {
        inner = rest;
    }
    let end = inner.find("```")?;
    Some(inner[..end].trim().to_string())
}
