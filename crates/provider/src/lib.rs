//! `docdiff-provider` - reasoning backends for sheet comparison.
//!
//! Every backend takes one pair of sheet bodies and returns a
//! [`DiffPayload`]. Selection happens once per run through
//! [`build_provider`]; the orchestrator only sees `dyn DiffProvider`.
//!
//! Completion text is never trusted: it always goes through
//! [`normalize::normalize_completion`] before reaching the caller.

pub mod anthropic;
pub mod error;
pub mod gemini;
mod http;
pub mod normalize;
pub mod openai;
pub mod prompt;
pub mod schema;

use docdiff_config::{ConfigError, ProviderKind, ResolvedProviderConfig};
use docdiff_core::{DiffPayload, Language};

pub use error::CompareError;
pub use normalize::{extract_json, normalize_completion, parse_payload};

/// Sampling temperature sent to every backend
pub(crate) const TEMPERATURE: f32 = 0.1;

/// One sheet pair to compare.
#[derive(Debug, Clone, Copy)]
pub struct CompareRequest<'a> {
    pub sheet_name: &'a str,
    pub old_csv: &'a str,
    pub new_csv: &'a str,
    pub language: Language,
}

/// A reasoning backend bound to its configuration.
pub trait DiffProvider {
    fn kind(&self) -> ProviderKind;

    /// Effective model identifier, for logs and reports
    fn model(&self) -> &str;

    /// Compare one sheet pair. Blocks for the duration of the call.
    fn compare(&self, request: &CompareRequest<'_>) -> Result<DiffPayload, CompareError>;
}

/// Instantiate the backend selected by `config`. Performs no I/O.
pub fn build_provider(config: &ResolvedProviderConfig) -> Result<Box<dyn DiffProvider>, ConfigError> {
    log::debug!(
        "building {} provider (model {}, endpoint {})",
        config.provider.name(),
        config.model,
        config.base_url
    );
    let provider: Box<dyn DiffProvider> = match config.provider {
        ProviderKind::Gemini => Box::new(gemini::GeminiProvider::new(config)?),
        ProviderKind::OpenAI | ProviderKind::Local => Box::new(openai::OpenAIProvider::new(config)?),
        ProviderKind::Anthropic => Box::new(anthropic::AnthropicProvider::new(config)?),
    };
    Ok(provider)
}

/// The key, or the configuration error for a backend that cannot run without one.
pub(crate) fn require_key(kind: ProviderKind, key: Option<&str>) -> Result<&str, CompareError> {
    key.ok_or_else(|| {
        CompareError::from(ConfigError::MissingCredential {
            provider: kind.display_name().to_string(),
            env_var: docdiff_config::provider::env_var_name(kind),
        })
    })
}
