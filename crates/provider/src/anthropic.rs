// Anthropic messages backend

use docdiff_config::{ConfigError, ProviderKind, ResolvedProviderConfig};
use docdiff_core::DiffPayload;
use serde::{Deserialize, Serialize};

use crate::error::CompareError;
use crate::openai::EMPTY_COMPLETION_SUMMARY;
use crate::{http, normalize, prompt, require_key, CompareRequest, DiffProvider, TEMPERATURE};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;

pub struct AnthropicProvider {
    http: reqwest::blocking::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct MessagesRequest {
    model: String,
    system: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

impl AnthropicProvider {
    pub fn new(config: &ResolvedProviderConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            http: http::build_client(config.timeout)?,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

impl DiffProvider for AnthropicProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn compare(&self, request: &CompareRequest<'_>) -> Result<DiffPayload, CompareError> {
        let api_key = require_key(ProviderKind::Anthropic, self.api_key.as_deref())?;

        let url = format!("{}/messages", self.base_url);
        log::debug!("anthropic: POST {} (sheet '{}')", url, request.sheet_name);

        let body = MessagesRequest {
            model: self.model.clone(),
            system: prompt::system_prompt(request.language),
            messages: vec![Message {
                role: "user",
                content: prompt::user_prompt(request.sheet_name, request.old_csv, request.new_csv),
            }],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let response: MessagesResponse = http::send_json(
            ProviderKind::Anthropic,
            self.http
                .post(&url)
                .header("x-api-key", api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&body),
        )?;

        // First content block only
        let text = response
            .content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Ok(DiffPayload::empty(EMPTY_COMPLETION_SUMMARY));
        }
        normalize::normalize_completion(&text)
    }
}
