// Provider configuration and secrets
//
// API keys are resolved from, in order:
// 1. Command-line override
// 2. API_KEY environment variable
// 3. DOCDIFF_<PROVIDER>_KEY environment variable
// 4. System keychain (only with the `keychain` feature)
//
// Keys are NEVER stored in settings.json

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use docdiff_core::Language;

use crate::error::ConfigError;
use crate::settings::Settings;

pub const ENV_PROVIDER: &str = "LLM_PROVIDER";
pub const ENV_API_KEY: &str = "API_KEY";
pub const ENV_BASE_URL: &str = "API_BASE_URL";
pub const ENV_MODEL: &str = "MODEL_NAME";
pub const ENV_LANGUAGE: &str = "DOCDIFF_LANG";
pub const ENV_TIMEOUT: &str = "DOCDIFF_TIMEOUT_SECS";

/// Service name for keychain storage
#[cfg(feature = "keychain")]
const KEYCHAIN_SERVICE: &str = "docdiff";

/// Reasoning backend selection. Closed set, chosen once per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// Hosted structured-output service (default)
    Gemini,
    /// OpenAI-compatible chat completions
    OpenAI,
    /// Anthropic messages API
    Anthropic,
    /// Self-hosted OpenAI-compatible server (LM Studio, llama.cpp, Ollama)
    Local,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::Gemini,
        ProviderKind::OpenAI,
        ProviderKind::Anthropic,
        ProviderKind::Local,
    ];

    /// Selector value, as accepted by `LLM_PROVIDER`
    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenAI => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Local => "local",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "Gemini",
            ProviderKind::OpenAI => "OpenAI",
            ProviderKind::Anthropic => "Anthropic",
            ProviderKind::Local => "Local",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini-2.5-flash",
            ProviderKind::OpenAI => "gpt-4o",
            ProviderKind::Anthropic => "claude-3-5-sonnet-latest",
            ProviderKind::Local => "local-model",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            ProviderKind::OpenAI => "https://api.openai.com/v1",
            ProviderKind::Anthropic => "https://api.anthropic.com/v1",
            ProviderKind::Local => "http://localhost:1234/v1",
        }
    }

    /// Self-hosted servers usually run without authentication.
    pub fn needs_api_key(&self) -> bool {
        !matches!(self, ProviderKind::Local)
    }

    /// Whether the backend validates output against a response schema itself.
    pub fn enforces_schema(&self) -> bool {
        matches!(self, ProviderKind::Gemini)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        ProviderKind::ALL
            .into_iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| ConfigError::UnknownProvider(s.to_string()))
    }
}

/// Source of an API key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    /// Passed explicitly on the command line
    Flag,
    /// Retrieved from an environment variable
    Environment,
    /// Retrieved from system keychain
    Keychain,
    /// No key found
    None,
}

impl KeySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeySource::Flag => "flag",
            KeySource::Environment => "environment",
            KeySource::Keychain => "keychain",
            KeySource::None => "none",
        }
    }
}

/// Get the provider-specific environment variable name
pub fn env_var_name(provider: ProviderKind) -> String {
    format!("DOCDIFF_{}_KEY", provider.name().to_uppercase())
}

#[cfg(feature = "keychain")]
fn keychain_account(provider: ProviderKind) -> String {
    format!("ai/{}", provider.name())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn lookup_api_key(
    provider: ProviderKind,
    flag: Option<String>,
    env: &dyn Fn(&str) -> Option<String>,
) -> (Option<String>, KeySource) {
    if let Some(key) = non_empty(flag) {
        return (Some(key), KeySource::Flag);
    }
    if let Some(key) = non_empty(env(ENV_API_KEY)) {
        return (Some(key), KeySource::Environment);
    }
    if let Some(key) = non_empty(env(&env_var_name(provider))) {
        return (Some(key), KeySource::Environment);
    }

    #[cfg(feature = "keychain")]
    {
        if let Ok(entry) = keyring::Entry::new(KEYCHAIN_SERVICE, &keychain_account(provider)) {
            if let Ok(key) = entry.get_password() {
                return (Some(key), KeySource::Keychain);
            }
        }
    }

    (None, KeySource::None)
}

/// Check if keychain support is available
pub fn keychain_available() -> bool {
    #[cfg(feature = "keychain")]
    {
        keyring::Entry::new(KEYCHAIN_SERVICE, "test").is_ok()
    }
    #[cfg(not(feature = "keychain"))]
    {
        false
    }
}

// ============================================================================
// Resolved configuration (single source of truth)
// ============================================================================

/// Values supplied on the command line. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub language: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Status of the provider configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigStatus {
    /// Ready to make backend calls
    Ready,
    /// Provider needs an API key and none was found
    MissingKey,
}

impl ConfigStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::MissingKey => "missing_key",
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// The effective provider configuration, fully resolved from all sources.
#[derive(Clone)]
pub struct ResolvedProviderConfig {
    pub provider: ProviderKind,
    /// Effective model (override or provider default)
    pub model: String,
    /// Effective base URL, without trailing slash
    pub base_url: String,
    pub api_key: Option<String>,
    pub key_source: KeySource,
    pub language: Language,
    pub timeout: Duration,
    pub status: ConfigStatus,
    /// Human-readable reason if not ready
    pub blocking_reason: Option<String>,
}

// Hand-written so the key never lands in logs
impl fmt::Debug for ResolvedProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedProviderConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("key_source", &self.key_source)
            .field("language", &self.language)
            .field("timeout", &self.timeout)
            .field("status", &self.status)
            .finish()
    }
}

impl ResolvedProviderConfig {
    /// Resolve from settings, environment lookup and overrides.
    ///
    /// Fails only on values that can never work (unknown provider, unknown
    /// language, unparseable timeout). A missing key is reported through
    /// `status` so that runs needing no backend call can still proceed.
    pub fn resolve(
        settings: &Settings,
        overrides: &ConfigOverrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let provider_name = non_empty(overrides.provider.clone())
            .or_else(|| non_empty(env(ENV_PROVIDER)))
            .unwrap_or_else(|| settings.provider.provider.clone());
        let provider: ProviderKind = provider_name.parse()?;

        let language_code = non_empty(overrides.language.clone())
            .or_else(|| non_empty(env(ENV_LANGUAGE)))
            .unwrap_or_else(|| settings.language.clone());
        let language: Language = language_code.parse()?;

        let model = non_empty(overrides.model.clone())
            .or_else(|| non_empty(env(ENV_MODEL)))
            .or_else(|| non_empty(Some(settings.provider.model.clone())))
            .unwrap_or_else(|| provider.default_model().to_string());

        let base_url = non_empty(overrides.endpoint.clone())
            .or_else(|| non_empty(env(ENV_BASE_URL)))
            .or_else(|| non_empty(settings.provider.endpoint.clone()))
            .unwrap_or_else(|| provider.default_base_url().to_string())
            .trim_end_matches('/')
            .to_string();

        let timeout_secs = match (overrides.timeout_secs, non_empty(env(ENV_TIMEOUT))) {
            (Some(secs), _) => secs,
            (None, Some(raw)) => raw.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                name: ENV_TIMEOUT.to_string(),
                value: raw.clone(),
            })?,
            (None, None) => settings.provider.timeout_secs,
        };
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                name: "timeout".to_string(),
                value: "0".to_string(),
            });
        }

        let (api_key, key_source) = lookup_api_key(provider, overrides.api_key.clone(), &env);

        let (status, blocking_reason) = if provider.needs_api_key() && api_key.is_none() {
            (
                ConfigStatus::MissingKey,
                Some(format!(
                    "No API key found. Set {} or {}",
                    ENV_API_KEY,
                    env_var_name(provider)
                )),
            )
        } else {
            (ConfigStatus::Ready, None)
        };

        Ok(Self {
            provider,
            model,
            base_url,
            api_key,
            key_source,
            language,
            timeout: Duration::from_secs(timeout_secs),
            status,
            blocking_reason,
        })
    }

    /// Load settings and resolve against the process environment.
    pub fn load(overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let settings = Settings::load()?;
        Self::resolve(&settings, overrides, |name| std::env::var(name).ok())
    }
}

// ============================================================================
// Diagnostics (for `docdiff doctor`)
// ============================================================================

/// Diagnostic information about provider configuration
#[derive(Debug)]
pub struct ProviderDiagnostics {
    pub provider: String,
    pub model: String,
    pub base_url: String,
    pub language: String,
    pub timeout_secs: u64,
    pub status: ConfigStatus,
    pub key_present: bool,
    pub key_source: KeySource,
    pub keychain_available: bool,
    pub schema_enforced: bool,
    pub blocking_reason: Option<String>,
}

impl ProviderDiagnostics {
    pub fn from_resolved(config: &ResolvedProviderConfig) -> Self {
        Self {
            provider: config.provider.name().to_string(),
            model: config.model.clone(),
            base_url: config.base_url.clone(),
            language: config.language.code().to_string(),
            timeout_secs: config.timeout.as_secs(),
            status: config.status,
            key_present: config.api_key.is_some(),
            key_source: config.key_source,
            keychain_available: keychain_available(),
            schema_enforced: config.provider.enforces_schema(),
            blocking_reason: config.blocking_reason.clone(),
        }
    }
}

impl fmt::Display for ProviderDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Provider Configuration")?;
        writeln!(f, "──────────────────────────────")?;
        writeln!(f, "Provider:          {}", self.provider)?;
        writeln!(f, "Status:            {}", self.status.as_str())?;
        writeln!(f, "Model:             {}", self.model)?;
        writeln!(f, "Endpoint:          {}", self.base_url)?;
        writeln!(f, "Language:          {}", self.language)?;
        writeln!(f, "Timeout:           {}s", self.timeout_secs)?;
        writeln!(f, "Key present:       {}", if self.key_present { "yes" } else { "no" })?;
        writeln!(f, "Key source:        {}", self.key_source.as_str())?;
        writeln!(f, "Keychain available:{}", if self.keychain_available { "yes" } else { "no" })?;
        writeln!(f, "Schema enforced:   {}", if self.schema_enforced { "yes" } else { "no" })?;
        if let Some(reason) = &self.blocking_reason {
            writeln!(f, "Blocking reason:   {}", reason)?;
        }
        Ok(())
    }
}
