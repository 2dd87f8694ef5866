// Gemini generateContent backend
//
// The only backend that enforces the response schema server-side. Its text
// still goes through the normalizer so every backend shares one validator.

use docdiff_config::{ConfigError, ProviderKind, ResolvedProviderConfig};
use docdiff_core::DiffPayload;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CompareError;
use crate::{http, normalize, prompt, require_key, schema, CompareRequest, DiffProvider, TEMPERATURE};

/// Summary returned when the backend produced no text at all
pub const EMPTY_RESPONSE_SUMMARY: &str = "No response generated.";

pub struct GeminiProvider {
    http: reqwest::blocking::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Deserialize)]
struct GenerateResponse {
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
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GeminiProvider {
    pub fn new(config: &ResolvedProviderConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            http: http::build_client(config.timeout)?,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn build_request(&self, request: &CompareRequest<'_>) -> GenerateRequest {
        GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: prompt::system_prompt(request.language),
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part {
                    text: prompt::user_prompt(request.sheet_name, request.old_csv, request.new_csv),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                response_mime_type: "application/json",
                response_schema: schema::response_schema(),
            },
        }
    }
}

impl DiffProvider for GeminiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn compare(&self, request: &CompareRequest<'_>) -> Result<DiffPayload, CompareError> {
        let api_key = require_key(ProviderKind::Gemini, self.api_key.as_deref())?;

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        log::debug!("gemini: POST {} (sheet '{}')", url, request.sheet_name);

        let body = self.build_request(request);
        let response: GenerateResponse = http::send_json(
            ProviderKind::Gemini,
            self.http
                .post(&url)
                .header("x-goog-api-key", api_key)
                .json(&body),
        )?;

        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Ok(DiffPayload::empty(EMPTY_RESPONSE_SUMMARY));
        }
        normalize::normalize_completion(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docdiff_config::{ConfigOverrides, Settings};
    use docdiff_core::Language;
    use httpmock::prelude::*;

    fn provider_for(server: &MockServer, api_key: Option<&str>) -> GeminiProvider {
        let overrides = ConfigOverrides {
            provider: Some("gemini".into()),
            endpoint: Some(server.base_url()),
            api_key: api_key.map(String::from),
            ..Default::default()
        };
        let config = ResolvedProviderConfig::resolve(&Settings::default(), &overrides, |_| None).unwrap();
        GeminiProvider::new(&config).unwrap()
    }

    fn request() -> CompareRequest<'static> {
        CompareRequest {
            sheet_name: "Users",
            old_csv: "column,type\nemail,VARCHAR(50)\n",
            new_csv: "column,type\nemail,VARCHAR(100)\n",
            language: Language::Ja,
        }
    }

    fn envelope(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
        })
    }

    #[test]
    fn test_sends_schema_and_parses_text() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/models/gemini-2.5-flash:generateContent")
                .header("x-goog-api-key", "g-key")
                .body_includes("\"responseMimeType\":\"application/json\"")
                .body_includes("\"responseSchema\"")
                .body_includes("in Japanese.");
            then.status(200).json_body(envelope(
                r#"{"diffs":[{"type":"COLUMN","action":"MODIFIED","target":"email","description":"長さ変更"}],"summary":"1件"}"#,
            ));
        });

        let payload = provider_for(&server, Some("g-key")).compare(&request()).unwrap();

        mock.assert();
        assert_eq!(payload.diffs.len(), 1);
        assert_eq!(payload.summary, "1件");
    }

    #[test]
    fn test_missing_key_makes_no_request() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST);
            then.status(200);
        });

        let err = provider_for(&server, None).compare(&request()).unwrap_err();

        mock.assert_calls(0);
        assert!(matches!(err, CompareError::Configuration(_)));
    }

    #[test]
    fn test_empty_candidates_yield_placeholder() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST);
            then.status(200).json_body(serde_json::json!({ "candidates": [] }));
        });

        let payload = provider_for(&server, Some("g-key")).compare(&request()).unwrap();
        assert!(payload.diffs.is_empty());
        assert_eq!(payload.summary, EMPTY_RESPONSE_SUMMARY);
    }

    #[test]
    fn test_http_error_keeps_status_and_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST);
            then.status(403).body("API key not valid");
        });

        let err = provider_for(&server, Some("bad")).compare(&request()).unwrap_err();
        assert_eq!(
            err,
            CompareError::Provider {
                provider: ProviderKind::Gemini,
                status: Some(403),
                message: "API key not valid".to_string(),
            }
        );
    }
}
