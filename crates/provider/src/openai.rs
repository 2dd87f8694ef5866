// OpenAI-compatible chat completions backend
//
// Serves both the hosted OpenAI API and self-hosted servers (LM Studio,
// llama.cpp, Ollama). Local servers often reject `response_format`, so it is
// only sent to the hosted API.

use docdiff_config::{ConfigError, ProviderKind, ResolvedProviderConfig};
use docdiff_core::DiffPayload;
use serde::{Deserialize, Serialize};

use crate::error::CompareError;
use crate::{http, normalize, prompt, require_key, CompareRequest, DiffProvider, TEMPERATURE};

/// Summary returned when the completion carried no text
pub const EMPTY_COMPLETION_SUMMARY: &str = "No content generated.";

pub struct OpenAIProvider {
    kind: ProviderKind,
    http: reqwest::blocking::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatResponseMessage>,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl OpenAIProvider {
    /// Build for `ProviderKind::OpenAI` or `ProviderKind::Local`.
    pub fn new(config: &ResolvedProviderConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            kind: config.provider,
            http: http::build_client(config.timeout)?,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn is_local(&self) -> bool {
        self.kind == ProviderKind::Local
    }

    fn build_request(&self, request: &CompareRequest<'_>) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompt::system_prompt(request.language),
                },
                ChatMessage {
                    role: "user",
                    content: prompt::user_prompt(request.sheet_name, request.old_csv, request.new_csv),
                },
            ],
            temperature: TEMPERATURE,
            response_format: if self.is_local() {
                None
            } else {
                Some(ResponseFormat {
                    format_type: "json_object",
                })
            },
        }
    }
}

impl DiffProvider for OpenAIProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn compare(&self, request: &CompareRequest<'_>) -> Result<DiffPayload, CompareError> {
        // Local servers run unauthenticated unless a key was configured
        let api_key = if self.is_local() {
            self.api_key.as_deref()
        } else {
            Some(require_key(self.kind, self.api_key.as_deref())?)
        };

        let url = format!("{}/chat/completions", self.base_url);
        log::debug!("{}: POST {} (sheet '{}')", self.kind.name(), url, request.sheet_name);

        let mut builder = self.http.post(&url).json(&self.build_request(request));
        if let Some(key) = api_key {
            builder = builder.bearer_auth(key);
        }

        let response: ChatResponse = http::send_json(self.kind, builder)?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Ok(DiffPayload::empty(EMPTY_COMPLETION_SUMMARY));
        }
        normalize::normalize_completion(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docdiff_config::{ConfigOverrides, Settings};
    use docdiff_core::{ChangeAction, Language};
    use httpmock::prelude::*;

    fn provider_for(server: &MockServer, kind: &str, api_key: Option<&str>) -> OpenAIProvider {
        let overrides = ConfigOverrides {
            provider: Some(kind.into()),
            endpoint: Some(server.base_url()),
            api_key: api_key.map(String::from),
            ..Default::default()
        };
        let config = ResolvedProviderConfig::resolve(&Settings::default(), &overrides, |_| None).unwrap();
        OpenAIProvider::new(&config).unwrap()
    }

    fn request() -> CompareRequest<'static> {
        CompareRequest {
            sheet_name: "Orders",
            old_csv: "column,nullable\nuser_id,YES\n",
            new_csv: "column,nullable\nuser_id,NO\n",
            language: Language::En,
        }
    }

    fn completion(content: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-1",
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": content }, "finish_reason": "stop" }]
        })
    }

    #[test]
    fn test_openai_request_shape() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/chat/completions")
                .header("authorization", "Bearer sk-test")
                .body_includes("\"model\":\"gpt-4o\"")
                .body_includes("\"response_format\":{\"type\":\"json_object\"}")
                .body_includes("\"temperature\":0.1");
            then.status(200).json_body(completion(serde_json::json!(
                r#"{"diffs":[{"type":"COLUMN","action":"MODIFIED","target":"user_id","description":"Now NOT NULL","oldValue":"NULL","newValue":"NOT NULL"}],"summary":"Nullability tightened"}"#
            )));
        });

        let payload = provider_for(&server, "openai", Some("sk-test"))
            .compare(&request())
            .unwrap();

        mock.assert();
        assert_eq!(payload.diffs[0].action, ChangeAction::Modified);
        assert_eq!(payload.diffs[0].new_value.as_deref(), Some("NOT NULL"));
        assert_eq!(payload.summary, "Nullability tightened");
    }

    #[test]
    fn test_openai_requires_key() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST);
            then.status(200);
        });

        let err = provider_for(&server, "openai", None).compare(&request()).unwrap_err();

        mock.assert_calls(0);
        assert!(matches!(err, CompareError::Configuration(_)));
    }

    #[test]
    fn test_local_omits_response_format_and_recovers_fence() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/chat/completions")
                .body_includes("\"model\":\"local-model\"");
            then.status(200).json_body(completion(serde_json::json!(
                "Here is the result:\n```json\n{\"diffs\":[],\"summary\":\"ok\"}\n```"
            )));
        });
        let with_format = server.mock(|when, then| {
            when.method(POST).body_includes("response_format");
            then.status(500);
        });

        let payload = provider_for(&server, "local", None).compare(&request()).unwrap();

        mock.assert();
        with_format.assert_calls(0);
        assert!(payload.diffs.is_empty());
        assert_eq!(payload.summary, "ok");
    }

    #[test]
    fn test_null_content_yields_placeholder() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST);
            then.status(200).json_body(completion(serde_json::Value::Null));
        });

        let payload = provider_for(&server, "local", None).compare(&request()).unwrap();
        assert_eq!(payload, DiffPayload::empty(EMPTY_COMPLETION_SUMMARY));
    }

    #[test]
    fn test_server_error_is_provider_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST);
            then.status(500).body("model not loaded");
        });

        let err = provider_for(&server, "local", None).compare(&request()).unwrap_err();
        assert_eq!(err.to_string(), "Local API error: 500 - model not loaded");
    }

    #[test]
    fn test_unparseable_completion_is_malformed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST);
            then.status(200)
                .json_body(completion(serde_json::json!("I cannot help with that.")));
        });

        let err = provider_for(&server, "openai", Some("sk-test"))
            .compare(&request())
            .unwrap_err();
        assert!(matches!(err, CompareError::MalformedResponse(_)));
    }

    #[test]
    fn test_garbage_envelope_is_provider_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST);
            then.status(200).body("<html>proxy login</html>");
        });

        let err = provider_for(&server, "openai", Some("sk-test"))
            .compare(&request())
            .unwrap_err();
        assert!(matches!(
            err,
            CompareError::Provider { status: Some(200), .. }
        ));
    }

    #[test]
    fn test_unreachable_server_has_no_status() {
        let overrides = ConfigOverrides {
            provider: Some("local".into()),
            // Reserved port; nothing listens there
            endpoint: Some("http://127.0.0.1:9/v1".into()),
            timeout_secs: Some(5),
            ..Default::default()
        };
        let config = ResolvedProviderConfig::resolve(&Settings::default(), &overrides, |_| None).unwrap();
        let err = OpenAIProvider::new(&config).unwrap().compare(&request()).unwrap_err();
        assert!(matches!(
            err,
            CompareError::Provider { status: None, provider: ProviderKind::Local, .. }
        ));
    }
}
