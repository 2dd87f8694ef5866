use std::fmt;

/// Configuration problems detected before any backend call is attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Provider selector outside the supported set.
    UnknownProvider(String),
    /// Output language outside the supported set.
    UnknownLanguage(String),
    /// Provider requires a credential and none was found.
    MissingCredential { provider: String, env_var: String },
    /// A setting or environment value could not be interpreted.
    InvalidValue { name: String, value: String },
    /// settings.json could not be read or parsed.
    Settings(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownProvider(name) => write!(
                f,
                "unknown provider '{name}' (expected one of: gemini, openai, anthropic, local)"
            ),
            Self::UnknownLanguage(code) => {
                write!(f, "unsupported language '{code}' (expected one of: en, ja, fr)")
            }
            Self::MissingCredential { provider, env_var } => {
                write!(f, "API key is missing for {provider}. Set {env_var} or API_KEY")
            }
            Self::InvalidValue { name, value } => write!(f, "invalid value for {name}: '{value}'"),
            Self::Settings(msg) => write!(f, "settings error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<docdiff_core::UnknownLanguage> for ConfigError {
    fn from(err: docdiff_core::UnknownLanguage) -> Self {
        Self::UnknownLanguage(err.0)
    }
}
