use serde::{Deserialize, Serialize};

use super::{GenAiError, GenerationOptions, TextGenerator};
use crate::config;

/// Gemini HTTP client for hosted clinical reasoning.
pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl GeminiClient {
    /// Create a client for the given API key with the default model.
    pub fn new(api_key: &str) -> Self {
        Self::with_model(api_key, config::DEFAULT_GEMINI_MODEL)
    }

    /// Create a client pinned to a specific model.
    pub fn with_model(api_key: &str, model: &str) -> Self {
        let timeout_secs = config::GEMINI_TIMEOUT_SECS;
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: config::GEMINI_API_BASE.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            client,
            timeout_secs,
        }
    }

    /// Override the API endpoint (tests, proxies).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Build a client from the GEMINI_API_KEY environment variable.
    /// Returns None when no key is configured; callers are expected to
    /// degrade to rule-based validation.
    pub fn from_env() -> Option<Self> {
        std::env::var(config::GEMINI_API_KEY_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(|key| Self::new(&key))
    }
}

/// Request body for generateContent
#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    top_k: u32,
    top_p: f64,
    max_output_tokens: u32,
}

/// Response body from generateContent
#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl TextGenerator for GeminiClient {
    fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String, GenAiError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: options.temperature,
                top_k: options.top_k,
                top_p: options.top_p,
                max_output_tokens: options.max_output_tokens,
            },
        };

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_connect() {
                GenAiError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                GenAiError::Timeout {
                    secs: self.timeout_secs,
                }
            } else {
                GenAiError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(GenAiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .map_err(|e| GenAiError::ResponseParsing(e.to_string()))?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GenAiError::EmptyResponse);
        }

        Ok(text)
    }
}

/// Mock generator for testing — returns a configurable response.
pub struct MockTextGenerator {
    response: Option<String>,
}

impl MockTextGenerator {
    pub fn new(response: &str) -> Self {
        Self {
            response: Some(response.to_string()),
        }
    }

    /// A generator whose every call fails with a connection error.
    pub fn failing() -> Self {
        Self { response: None }
    }
}

impl TextGenerator for MockTextGenerator {
    fn generate(&self, _prompt: &str, _options: &GenerationOptions) -> Result<String, GenAiError> {
        match &self.response {
            Some(response) => Ok(response.clone()),
            None => Err(GenAiError::Connection("mock endpoint".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_generator_returns_configured_response() {
        let generator = MockTextGenerator::new("test response");
        let result = generator
            .generate("prompt", &GenerationOptions::default())
            .unwrap();
        assert_eq!(result, "test response");
    }

    #[test]
    fn failing_mock_returns_connection_error() {
        let generator = MockTextGenerator::failing();
        let result = generator.generate("prompt", &GenerationOptions::default());
        assert!(matches!(result, Err(GenAiError::Connection(_))));
    }

    #[test]
    fn client_constructor_uses_defaults() {
        let client = GeminiClient::new("test-key");
        assert_eq!(client.base_url, config::GEMINI_API_BASE);
        assert_eq!(client.model, config::DEFAULT_GEMINI_MODEL);
        assert_eq!(client.timeout_secs, config::GEMINI_TIMEOUT_SECS);
    }

    #[test]
    fn with_model_overrides_default() {
        let client = GeminiClient::with_model("test-key", "gemini-1.5-pro");
        assert_eq!(client.model, "gemini-1.5-pro");
    }

    #[test]
    fn with_base_url_trims_trailing_slash() {
        let client = GeminiClient::new("test-key").with_base_url("http://localhost:9090/");
        assert_eq!(client.base_url, "http://localhost:9090");
    }

    #[test]
    fn default_options_match_clinical_config() {
        let options = GenerationOptions::default();
        assert_eq!(options.temperature, 0.2);
        assert_eq!(options.top_k, 40);
        assert_eq!(options.top_p, 0.95);
        assert_eq!(options.max_output_tokens, 4096);
    }

    #[test]
    fn request_serializes_with_camel_case_config() {
        let options = GenerationOptions::default();
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: "hello" }],
            }],
            generation_config: GenerationConfig {
                temperature: options.temperature,
                top_k: options.top_k,
                top_p: options.top_p,
                max_output_tokens: options.max_output_tokens,
            },
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(json["generationConfig"]["topK"], 40);
        assert_eq!(json["generationConfig"]["topP"], 0.95);
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 4096);
    }

    #[test]
    fn response_text_extraction() {
        let raw = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "{\"is_safe\": true}"}]}}
            ]
        }"#;
        let parsed: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text);
        assert_eq!(text.as_deref(), Some("{\"is_safe\": true}"));
    }

    #[test]
    fn response_without_candidates_parses_to_empty() {
        let parsed: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.candidates.is_empty());
    }

    #[test]
    fn from_env_reflects_key_presence() {
        // Set/unset in one test to avoid races with parallel tests.
        std::env::set_var(config::GEMINI_API_KEY_VAR, "env-test-key");
        assert!(GeminiClient::from_env().is_some());

        std::env::set_var(config::GEMINI_API_KEY_VAR, "   ");
        assert!(GeminiClient::from_env().is_none());

        std::env::remove_var(config::GEMINI_API_KEY_VAR);
        assert!(GeminiClient::from_env().is_none());
    }
}
