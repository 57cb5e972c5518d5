//! Generative-AI API client.
//!
//! Sends prompts to the key-authenticated model endpoint with a generation
//! config that forces JSON output, and recovers structured objects from the
//! free-form reply text via span extraction with a single repair round.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use corpscope_core::JsonExtractor;
use corpscope_core::config::GenerativeConfig;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::errors::UpstreamError;
use crate::transport::HttpTransport;

/// Trait for text-generation backends.
#[async_trait]
pub trait TextGenerator: Send + Sync + std::fmt::Debug {
    /// Generates a reply for the prompt.
    ///
    /// # Errors
    /// - `UpstreamError::RequestFailed` - Transport failure after retries
    /// - `UpstreamError::UpstreamStatus` - Non-success HTTP status
    /// - `UpstreamError::MalformedPayload` - Reply body was not decodable
    /// - `UpstreamError::NotConfigured` - Backend has no credentials
    async fn generate(&self, prompt: &str) -> Result<GenerateReply, UpstreamError>;
}

/// Decoded reply from the generation endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateReply {
    /// Candidate completions, usually exactly one
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// One candidate completion.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candidate {
    /// Structured content of the candidate
    #[serde(default)]
    pub content: CandidateContent,
}

/// Content block of a candidate.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateContent {
    /// Ordered content parts
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// One content part; only text parts are used.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Part {
    /// Text payload of the part, if any
    #[serde(default)]
    pub text: Option<String>,
}

impl GenerateReply {
    /// Builds a single-candidate reply around one text part.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            candidates: vec![Candidate {
                content: CandidateContent {
                    parts: vec![Part {
                        text: Some(text.into()),
                    }],
                },
            }],
        }
    }

    /// Concatenates every text fragment across all candidates and parts,
    /// newline-joined and trimmed.
    pub fn collect_text(&self) -> String {
        let mut texts = Vec::new();
        for candidate in &self.candidates {
            for part in &candidate.content.parts {
                if let Some(text) = part.text.as_deref() {
                    if !text.is_empty() {
                        texts.push(text);
                    }
                }
            }
        }
        texts.join("\n").trim().to_string()
    }
}

/// Real generation client.
#[derive(Debug)]
pub struct GeminiClient {
    transport: HttpTransport,
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
    temperature: f64,
    max_output_tokens: u32,
}

impl GeminiClient {
    /// Creates a client from config; the caller guarantees a key is present.
    pub fn new(config: &GenerativeConfig, api_key: String, transport: HttpTransport) -> Self {
        Self {
            transport,
            base_url: config.base_url.clone(),
            api_key,
            model: config.model.clone(),
            timeout: config.timeout,
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<GenerateReply, UpstreamError> {
        let url = format!("{}/{}:generateContent", self.base_url, self.model);

        let body = json!({
            "contents": [{"parts": [{"text": prompt}]}],
            "generationConfig": {
                "temperature": self.temperature,
                "maxOutputTokens": self.max_output_tokens,
                "responseMimeType": "application/json"
            }
        });

        let response = self
            .transport
            .post_json(&url, &[("key", self.api_key.as_str())], &body, self.timeout)
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::UpstreamStatus {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| UpstreamError::MalformedPayload {
                reason: e.to_string(),
            })
    }
}

/// Backend used when no API key is configured.
///
/// Never reaches the network; every call reports the missing credential so
/// callers degrade to their no-AI behavior.
#[derive(Debug, Default)]
pub struct DisabledGenerator;

#[async_trait]
impl TextGenerator for DisabledGenerator {
    async fn generate(&self, _prompt: &str) -> Result<GenerateReply, UpstreamError> {
        Err(UpstreamError::NotConfigured {
            service: "generative",
        })
    }
}

/// Scripted backend for tests and offline development.
///
/// Pops one queued reply per call and counts invocations; an exhausted
/// queue yields empty replies.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<GenerateReply>>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    /// Creates an empty scripted generator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a reply wrapping the given text.
    pub fn push_text(&self, text: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(GenerateReply::from_text(text));
    }

    /// Number of generate calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, _prompt: &str) -> Result<GenerateReply, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }
}

/// Generates a JSON object for the prompt, with one repair round.
///
/// The reply text is narrowed by the extractor and parsed; when that fails
/// the raw text is sent back to the model wrapped in a fix-this prompt and
/// extraction plus parse run once more. A second failure propagates.
///
/// # Errors
/// - `UpstreamError::MalformedPayload` - No parseable object after repair
/// - Propagates any [`TextGenerator::generate`] error
pub async fn generate_json(
    generator: &dyn TextGenerator,
    extractor: &dyn JsonExtractor,
    prompt: &str,
) -> Result<Value, UpstreamError> {
    let reply = generator.generate(prompt).await?;
    let text = reply.collect_text();

    match parse_span(extractor, &text) {
        Ok(value) => Ok(value),
        Err(first_error) => {
            debug!("model output unparseable, requesting repair: {first_error}");
            let repaired = generator.generate(&format!("Fix JSON:\n{text}")).await?;
            parse_span(extractor, &repaired.collect_text())
        }
    }
}

fn parse_span(extractor: &dyn JsonExtractor, text: &str) -> Result<Value, UpstreamError> {
    let span = extractor.extract(text);
    if span.is_empty() {
        return Err(UpstreamError::MalformedPayload {
            reason: "no JSON object in model output".to_string(),
        });
    }
    serde_json::from_str(span).map_err(|e| UpstreamError::MalformedPayload {
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use corpscope_core::BraceSpanExtractor;

    use super::*;

    #[test]
    fn test_collect_text_joins_all_parts() {
        let reply: GenerateReply = serde_json::from_value(json!({
            "candidates": [
                {"content": {"parts": [{"text": "first"}, {"text": "second"}]}},
                {"content": {"parts": [{"text": "  third  "}]}}
            ]
        }))
        .unwrap();

        assert_eq!(reply.collect_text(), "first\nsecond\n  third");
    }

    #[test]
    fn test_collect_text_skips_missing_fragments() {
        let reply: GenerateReply = serde_json::from_value(json!({
            "candidates": [
                {"content": {"parts": [{"text": ""}, {}, {"text": "only"}]}}
            ]
        }))
        .unwrap();

        assert_eq!(reply.collect_text(), "only");
    }

    #[test]
    fn test_empty_reply_collects_empty_text() {
        assert_eq!(GenerateReply::default().collect_text(), "");
    }

    #[tokio::test]
    async fn test_generate_json_parses_first_reply() {
        let generator = ScriptedGenerator::new();
        generator.push_text(r#"here you go {"vision": "성장"} done"#);

        let value = generate_json(&generator, &BraceSpanExtractor, "prompt")
            .await
            .unwrap();

        assert_eq!(value["vision"], "성장");
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_generate_json_repairs_once() {
        let generator = ScriptedGenerator::new();
        generator.push_text(r#"{"vision": 깨진 JSON"#);
        generator.push_text(r#"{"vision": "복구됨"}"#);

        let value = generate_json(&generator, &BraceSpanExtractor, "prompt")
            .await
            .unwrap();

        assert_eq!(value["vision"], "복구됨");
        assert_eq!(generator.call_count(), 2);
    }

    #[tokio::test]
    async fn test_generate_json_fails_after_second_bad_reply() {
        let generator = ScriptedGenerator::new();
        generator.push_text("no json at all");
        generator.push_text("still nothing");

        let result = generate_json(&generator, &BraceSpanExtractor, "prompt").await;

        assert!(matches!(
            result,
            Err(UpstreamError::MalformedPayload { .. })
        ));
        assert_eq!(generator.call_count(), 2);
    }

    #[tokio::test]
    async fn test_disabled_generator_never_succeeds() {
        let result = DisabledGenerator.generate("prompt").await;
        assert!(matches!(result, Err(UpstreamError::NotConfigured { .. })));
    }
}
