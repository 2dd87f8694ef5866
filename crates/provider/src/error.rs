use std::fmt;

use docdiff_config::{ConfigError, ProviderKind};

/// Failure of a single sheet comparison. Recorded on the sheet; never aborts a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompareError {
    /// Credential or endpoint problem detected before any network call.
    Configuration(String),
    /// Transport failure (`status: None`) or non-success HTTP response.
    Provider {
        provider: ProviderKind,
        status: Option<u16>,
        message: String,
    },
    /// Completion text that could not be turned into a diff payload.
    MalformedResponse(String),
}

impl fmt::Display for CompareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareError::Configuration(msg) => write!(f, "{}", msg),
            CompareError::Provider {
                provider,
                status: Some(status),
                message,
            } => write!(f, "{} API error: {} - {}", provider.display_name(), status, message),
            CompareError::Provider {
                provider,
                status: None,
                message,
            } => write!(f, "{} request failed: {}", provider.display_name(), message),
            CompareError::MalformedResponse(msg) => {
                write!(f, "could not parse model response: {}", msg)
            }
        }
    }
}

impl std::error::Error for CompareError {}

impl From<ConfigError> for CompareError {
    fn from(err: ConfigError) -> Self {
        CompareError::Configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_status() {
        let err = CompareError::Provider {
            provider: ProviderKind::OpenAI,
            status: Some(429),
            message: "rate limited".to_string(),
        };
        assert_eq!(err.to_string(), "OpenAI API error: 429 - rate limited");
    }

    #[test]
    fn test_display_transport() {
        let err = CompareError::Provider {
            provider: ProviderKind::Local,
            status: None,
            message: "connection refused".to_string(),
        };
        assert_eq!(err.to_string(), "Local request failed: connection refused");
    }

    #[test]
    fn test_missing_credential_converts() {
        let err: CompareError = ConfigError::MissingCredential {
            provider: "Gemini".to_string(),
            env_var: "DOCDIFF_GEMINI_KEY".to_string(),
        }
        .into();
        assert!(matches!(err, CompareError::Configuration(_)));
        assert!(err.to_string().contains("API key is missing for Gemini"));
    }
}
