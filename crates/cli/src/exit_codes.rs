//! CLI Exit Code Registry
//!
//! Single source of truth for `docdiff` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success (every sheet COMPLETED, or run cancelled)    |
//! | 1    | General error                                        |
//! | 2    | Usage error (bad arguments, unwritable output)       |
//! | 3    | Run finished with one or more ERROR sheets           |
//! | 5    | Input file missing, unreadable or unparseable        |
//! | 11   | Provider needs an API key and none is configured     |
//! | 13   | Configuration error (unknown provider or language)   |
//! | 130  | Interrupted (second Ctrl-C)                          |

use docdiff_config::ConfigError;
use docdiff_io::LoadError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, output path not writable.
pub const EXIT_USAGE: u8 = 2;

/// The run completed but at least one sheet ended in ERROR.
pub const EXIT_SHEET_ERRORS: u8 = 3;

/// Input workbook could not be read or parsed.
pub const EXIT_PARSE: u8 = 5;

/// Provider configured but API key missing (`doctor` only; `compare` records
/// the failure per sheet instead).
pub const EXIT_MISSING_KEY: u8 = 11;

/// Unknown provider, unknown language, or unreadable settings.
pub const EXIT_CONFIG: u8 = 13;

/// Exit status used when a second interrupt aborts the process.
pub const EXIT_INTERRUPTED: i32 = 130;

pub fn config_exit_code(err: &ConfigError) -> u8 {
    match err {
        ConfigError::MissingCredential { .. } => EXIT_MISSING_KEY,
        ConfigError::UnknownProvider(_)
        | ConfigError::UnknownLanguage(_)
        | ConfigError::InvalidValue { .. }
        | ConfigError::Settings(_) => EXIT_CONFIG,
    }
}

pub fn load_exit_code(err: &LoadError) -> u8 {
    match err {
        LoadError::Io(_)
        | LoadError::UnsupportedFormat(_)
        | LoadError::Workbook(_)
        | LoadError::Csv(_) => EXIT_PARSE,
    }
}
