//! Google Gemini `generateContent` client
//!
//! Blocking on purpose: functions are documented one at a time, so the
//! single outstanding request is the whole workload.

use super::{Oracle, OracleError};
use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Header carrying the API key; the key is never part of a request URL
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Clone)]
pub struct GeminiOracle {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

impl GeminiOracle {
    /// Create a client for `model`; a leading `models/` is accepted and dropped
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, OracleError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(OracleError::Permanent(
                "Gemini API key cannot be empty".to_string(),
            ));
        }

        let model = model.into();
        let model = model.trim().trim_start_matches("models/").to_string();
        if model.is_empty() {
            return Err(OracleError::Permanent(
                "model identifier cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: build_client(DEFAULT_TIMEOUT)?,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, OracleError> {
        self.client = build_client(timeout)?;
        Ok(self)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn model_url(&self) -> String {
        format!("{}/v1beta/models/{}", self.base_url, self.model)
    }

    /// Pre-flight check that the model exists and the service answers
    ///
    /// A 404 means the model id is invalid; server errors surface as transient
    /// failures so the caller can tell an outage from a typo.
    pub fn verify_model(&self) -> Result<(), OracleError> {
        let response = self
            .client
            .get(self.model_url())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .send()
            .map_err(classify_transport_error)?;

        let status = response.status().as_u16();
        if response.status().is_success() {
            debug!(model = %self.model, "model verified");
            return Ok(());
        }

        let body = error_body(response);
        match status {
            404 => Err(OracleError::Permanent(format!(
                "invalid model '{}': {}",
                self.model, body
            ))),
            _ => Err(classify_status(status, body)),
        }
    }
}

impl Oracle for GeminiOracle {
    fn generate(&self, prompt: &str) -> Result<String, OracleError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
                role: Some("user".to_string()),
            }],
        };

        debug!(
            model = %self.model,
            prompt_bytes = prompt.len(),
            "sending generateContent request"
        );

        let response = self
            .client
            .post(format!("{}:generateContent", self.model_url()))
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&request)
            .send()
            .map_err(classify_transport_error)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            return Err(classify_status(status, error_body(response)));
        }

        let parsed: GenerateResponse = response.json().map_err(|e| {
            OracleError::Permanent(format!("failed to parse response: {}", e.without_url()))
        })?;

        let text = parsed.into_text()?;
        debug!(response_bytes = text.len(), "received generateContent response");
        Ok(text)
    }
}

fn build_client(timeout: Duration) -> Result<Client, OracleError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| OracleError::Permanent(format!("failed to create HTTP client: {}", e)))
}

fn error_body(response: Response) -> String {
    response
        .text()
        .unwrap_or_else(|_| "failed to read error response".to_string())
}

fn classify_transport_error(error: reqwest::Error) -> OracleError {
    let transient = error.is_timeout() || error.is_connect();
    let message = error.without_url().to_string();
    if transient {
        OracleError::Transient(message)
    } else {
        OracleError::Permanent(message)
    }
}

fn classify_status(status: u16, body: String) -> OracleError {
    let message = format!("status {}: {}", status, body);
    match status {
        408 | 429 | 500..=599 => OracleError::Transient(message),
        400 if body.contains("QUOTA_EXCEEDED") || body.contains("quota") => {
            OracleError::Transient(message)
        }
        _ => OracleError::Permanent(message),
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate
    fn into_text(self) -> Result<String, OracleError> {
        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| OracleError::Permanent("empty response from Gemini".to_string()))?;

        let finish_reason = candidate.finish_reason.unwrap_or_else(|| "unknown".to_string());
        let text: String = candidate
            .content
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(OracleError::Permanent(format!(
                "response contained no text (finish reason: {})",
                finish_reason
            )));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    const REPLY: &str = r#"{
        "candidates": [{
            "content": {
                "parts": [{"text": "Here you go:\n"}, {"text": "\"\"\"Add one.\"\"\""}],
                "role": "model"
            },
            "finishReason": "STOP",
            "index": 0
        }],
        "usageMetadata": {"promptTokenCount": 5, "candidatesTokenCount": 9, "totalTokenCount": 14}
    }"#;

    fn oracle_for(server: &Server) -> GeminiOracle {
        GeminiOracle::new("test-key", "gemini-1.5-flash")
            .unwrap()
            .with_base_url(server.url())
    }

    #[test]
    fn test_rejects_empty_key_and_model() {
        assert!(matches!(
            GeminiOracle::new("  ", DEFAULT_MODEL),
            Err(OracleError::Permanent(_))
        ));
        assert!(matches!(
            GeminiOracle::new("key", ""),
            Err(OracleError::Permanent(_))
        ));
    }

    #[test]
    fn test_models_prefix_is_stripped() {
        let oracle = GeminiOracle::new("key", "models/gemini-1.5-pro").unwrap();
        assert_eq!(oracle.model(), "gemini-1.5-pro");
    }

    #[test]
    fn test_generate_concatenates_parts() {
        let mut server = Server::new();
        let mock = server
            .mock("POST", "/v1beta/models/gemini-1.5-flash:generateContent")
            .match_header("x-goog-api-key", "test-key")
            .match_body(Matcher::Regex(r#""text":"def f\(\): pass""#.to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(REPLY)
            .create();

        let text = oracle_for(&server).generate("def f(): pass").unwrap();
        assert_eq!(text, "Here you go:\n\"\"\"Add one.\"\"\"");
        mock.assert();
    }

    #[test]
    fn test_rate_limit_is_transient() {
        let mut server = Server::new();
        let _mock = server
            .mock("POST", "/v1beta/models/gemini-1.5-flash:generateContent")
            .with_status(429)
            .with_body(r#"{"error": {"status": "RESOURCE_EXHAUSTED"}}"#)
            .create();

        let result = oracle_for(&server).generate("prompt");
        assert!(matches!(result, Err(OracleError::Transient(_))));
    }

    #[test]
    fn test_internal_error_is_transient() {
        let mut server = Server::new();
        let _mock = server
            .mock("POST", "/v1beta/models/gemini-1.5-flash:generateContent")
            .with_status(500)
            .create();

        let result = oracle_for(&server).generate("prompt");
        assert!(matches!(result, Err(OracleError::Transient(_))));
    }

    #[test]
    fn test_bad_request_is_permanent() {
        let mut server = Server::new();
        let _mock = server
            .mock("POST", "/v1beta/models/gemini-1.5-flash:generateContent")
            .with_status(400)
            .with_body(r#"{"error": {"status": "INVALID_ARGUMENT"}}"#)
            .create();

        let result = oracle_for(&server).generate("prompt");
        assert!(matches!(result, Err(OracleError::Permanent(_))));
    }

    #[test]
    fn test_blocked_response_without_text_is_an_error() {
        let mut server = Server::new();
        let _mock = server
            .mock("POST", "/v1beta/models/gemini-1.5-flash:generateContent")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#)
            .create();

        match oracle_for(&server).generate("prompt") {
            Err(OracleError::Permanent(message)) => assert!(message.contains("SAFETY")),
            other => panic!("expected permanent failure, got {:?}", other),
        }
    }

    #[test]
    fn test_connect_failure_does_not_reveal_key() {
        let oracle = GeminiOracle::new("SECRET-KEY-123", DEFAULT_MODEL)
            .unwrap()
            .with_base_url("http://127.0.0.1:9");

        for result in [oracle.generate("prompt").map(|_| ()), oracle.verify_model()] {
            match result {
                Err(err) => {
                    assert!(err.is_transient(), "{:?}", err);
                    assert!(!err.to_string().contains("SECRET-KEY-123"), "{}", err);
                }
                Ok(()) => panic!("nothing should be listening on port 9"),
            }
        }
    }

    #[test]
    fn test_key_is_sent_as_header_not_query() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/v1beta/models/gemini-1.5-flash")
            .match_header("x-goog-api-key", "test-key")
            .match_query(Matcher::Missing)
            .with_status(200)
            .with_body(r#"{"name": "models/gemini-1.5-flash"}"#)
            .create();

        oracle_for(&server).verify_model().unwrap();
        mock.assert();
    }

    #[test]
    fn test_verify_model() {
        let mut server = Server::new();
        let _ok = server
            .mock("GET", "/v1beta/models/gemini-1.5-flash")
            .with_status(200)
            .with_body(r#"{"name": "models/gemini-1.5-flash"}"#)
            .create();
        let _missing = server
            .mock("GET", "/v1beta/models/no-such-model")
            .with_status(404)
            .with_body(r#"{"error": {"status": "NOT_FOUND"}}"#)
            .create();

        assert!(oracle_for(&server).verify_model().is_ok());

        let missing = GeminiOracle::new("test-key", "no-such-model")
            .unwrap()
            .with_base_url(server.url());
        match missing.verify_model() {
            Err(OracleError::Permanent(message)) => {
                assert!(message.contains("invalid model 'no-such-model'"))
            }
            other => panic!("expected permanent failure, got {:?}", other),
        }
    }
}
