// Output languages for descriptions and summaries

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Natural language the backend writes `description` and `summary` in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ja,
    Fr,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::En, Language::Ja, Language::Fr];

    /// ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ja => "ja",
            Language::Fr => "fr",
        }
    }

    /// English name, used inside backend instructions
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Ja => "Japanese",
            Language::Fr => "French",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Language code outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLanguage(pub String);

impl fmt::Display for UnknownLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported language '{}' (expected one of: en, ja, fr)", self.0)
    }
}

impl std::error::Error for UnknownLanguage {}

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase();
        Language::ALL
            .into_iter()
            .find(|l| l.code() == code)
            .ok_or_else(|| UnknownLanguage(s.to_string()))
    }
}
