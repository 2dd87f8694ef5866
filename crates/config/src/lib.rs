// Configuration loading
//
// Layers, lowest to highest precedence:
//   defaults < settings.json < environment < command-line overrides
// Resolved once per process; nothing here is re-read per request.

pub mod error;
pub mod provider;
pub mod settings;

pub use error::ConfigError;
pub use provider::{
    ConfigOverrides, ConfigStatus, KeySource, ProviderDiagnostics, ProviderKind,
    ResolvedProviderConfig,
};
pub use settings::Settings;
