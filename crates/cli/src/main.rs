// docdiff CLI - semantic diff of database-definition workbooks

mod exit_codes;
mod render;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use docdiff_config::{ConfigError, ConfigOverrides, ProviderDiagnostics, ResolvedProviderConfig};
use docdiff_engine::{CancelToken, LedgerObserver, LedgerSnapshot, NoopObserver, RunOptions};
use docdiff_io::LoadError;

use exit_codes::{
    config_exit_code, load_exit_code, EXIT_ERROR, EXIT_INTERRUPTED, EXIT_MISSING_KEY, EXIT_SHEET_ERRORS,
    EXIT_SUCCESS, EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "docdiff")]
#[command(about = "Semantic diff of database definition spreadsheets")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two versions of a workbook sheet by sheet
    #[command(after_help = "\
Examples:
  docdiff compare schema_v1.xlsx schema_v2.xlsx
  docdiff compare old.xlsx new.xlsx --lang ja --json -o diff.json
  LLM_PROVIDER=local API_BASE_URL=http://localhost:1234/v1 docdiff compare a.xlsx b.xlsx")]
    Compare {
        /// Previous version of the workbook
        old: PathBuf,

        /// New version of the workbook
        new: PathBuf,

        /// Output language for descriptions and summaries (en, ja, fr)
        #[arg(long)]
        lang: Option<String>,

        /// Backend: gemini, openai, anthropic, local
        #[arg(long)]
        provider: Option<String>,

        /// Model identifier (default depends on provider)
        #[arg(long)]
        model: Option<String>,

        /// Base URL of the backend API
        #[arg(long)]
        endpoint: Option<String>,

        /// API key (prefer API_KEY or DOCDIFF_<PROVIDER>_KEY)
        #[arg(long, hide = true)]
        api_key: Option<String>,

        /// Per-request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Emit the run report as JSON
        #[arg(long)]
        json: bool,

        /// Write output to a file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// No progress on stderr
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// List the sheets docdiff sees in a workbook
    Sheets {
        file: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// Show the resolved provider configuration
    Doctor {
        /// Backend to diagnose instead of the configured one
        #[arg(long)]
        provider: Option<String>,

        #[arg(long)]
        json: bool,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (",
        env!("GIT_COMMIT_HASH"),
        ")",
        "\ntarget:  ",
        env!("TARGET"),
        "\nreport schema_version: 1",
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Compare {
            old,
            new,
            lang,
            provider,
            model,
            endpoint,
            api_key,
            timeout,
            json,
            output,
            quiet,
        } => {
            let overrides = ConfigOverrides {
                provider,
                model,
                endpoint,
                api_key,
                language: lang,
                timeout_secs: timeout,
            };
            cmd_compare(&old, &new, &overrides, json, output.as_deref(), quiet)
        }
        Commands::Sheets { file, json } => cmd_sheets(&file, json),
        Commands::Doctor { provider, json } => cmd_doctor(provider, json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env = env_logger::Env::default().default_filter_or(default_filter);
    // Already initialised only happens under test harnesses
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn config(err: ConfigError) -> Self {
        let hint = match &err {
            ConfigError::UnknownProvider(_) => Some("set LLM_PROVIDER or --provider to gemini, openai, anthropic or local".to_string()),
            ConfigError::UnknownLanguage(_) => Some("use --lang en, ja or fr".to_string()),
            ConfigError::Settings(_) => Some(format!(
                "fix or remove {}",
                docdiff_config::Settings::config_path_display()
            )),
            _ => None,
        };
        Self { code: config_exit_code(&err), message: err.to_string(), hint }
    }

    pub fn load(err: LoadError) -> Self {
        Self { code: load_exit_code(&err), message: err.to_string(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// compare
// ============================================================================

fn cmd_compare(
    old_path: &Path,
    new_path: &Path,
    overrides: &ConfigOverrides,
    json: bool,
    output: Option<&Path>,
    quiet: bool,
) -> Result<(), CliError> {
    let config = ResolvedProviderConfig::load(overrides).map_err(CliError::config)?;
    log::debug!("resolved configuration: {:?}", config);
    if let Some(reason) = &config.blocking_reason {
        // Not fatal: sheets that need a call will each fail, the rest still resolve
        log::warn!("{}: {}", config.provider.display_name(), reason);
    }

    let old = docdiff_io::load_workbook(old_path).map_err(CliError::load)?;
    let new = docdiff_io::load_workbook(new_path).map_err(CliError::load)?;

    let provider = docdiff_provider::build_provider(&config).map_err(CliError::config)?;

    let cancel = CancelToken::new();
    install_interrupt_handler(&cancel);
    let options = RunOptions {
        language: config.language,
        cancel: Some(cancel),
    };

    let show_progress = !quiet && atty::is(atty::Stream::Stderr);
    let mut last_sheet = String::new();
    let mut progress = |snapshot: &LedgerSnapshot| {
        let current = &snapshot.progress.current_sheet_name;
        if current.is_empty() || *current == last_sheet {
            return;
        }
        if let Some(line) = render::progress_line(snapshot) {
            eprintln!("{}", line);
        }
        last_sheet = current.clone();
    };
    let mut noop = NoopObserver;
    let observer: &mut dyn LedgerObserver = if show_progress { &mut progress } else { &mut noop };

    let report = docdiff_engine::run(&old, &new, provider.as_ref(), &options, observer);

    let mut rendered = Vec::new();
    if json {
        let value = render::report_json(&report).map_err(|e| CliError::general(e.to_string()))?;
        let text = serde_json::to_string_pretty(&value).map_err(|e| CliError::general(e.to_string()))?;
        writeln!(rendered, "{}", text).map_err(|e| CliError::general(e.to_string()))?;
    } else {
        render::write_report_text(&mut rendered, &report).map_err(|e| CliError::general(e.to_string()))?;
    }
    emit(&rendered, output)?;

    if report.cancelled && !quiet {
        eprintln!("cancelled: {} sheet(s) skipped", report.count(docdiff_core::SheetStatus::Skipped));
    }

    let failed = report.count(docdiff_core::SheetStatus::Error);
    if failed > 0 {
        let err = CliError {
            code: EXIT_SHEET_ERRORS,
            message: format!("{} of {} sheet(s) failed", failed, report.results.len()),
            hint: None,
        };
        return Err(match config.blocking_reason {
            Some(reason) => err.with_hint(reason),
            None => err,
        });
    }
    Ok(())
}

/// First Ctrl-C skips the remaining sheets, a second one exits.
fn install_interrupt_handler(token: &CancelToken) {
    use signal_hook::consts::SIGINT;

    let flag = token.flag();
    if let Err(e) = signal_hook::flag::register_conditional_shutdown(SIGINT, EXIT_INTERRUPTED, flag.clone()) {
        log::debug!("cannot install shutdown handler: {}", e);
    }
    if let Err(e) = signal_hook::flag::register(SIGINT, flag) {
        log::debug!("cannot install interrupt handler: {}", e);
    }
}

fn emit(bytes: &[u8], output: Option<&Path>) -> Result<(), CliError> {
    match output {
        Some(path) => std::fs::write(path, bytes)
            .map_err(|e| CliError::io(format!("{}: {}", path.display(), e))),
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(bytes)
                .and_then(|_| handle.flush())
                .map_err(|e| CliError::io(e.to_string()))
        }
    }
}

// ============================================================================
// sheets
// ============================================================================

fn cmd_sheets(file: &Path, json: bool) -> Result<(), CliError> {
    let workbook = docdiff_io::load_workbook(file).map_err(CliError::load)?;

    let mut rendered = Vec::new();
    if json {
        let text = serde_json::to_string_pretty(&render::sheets_json(&workbook))
            .map_err(|e| CliError::general(e.to_string()))?;
        writeln!(rendered, "{}", text).map_err(|e| CliError::general(e.to_string()))?;
    } else {
        render::write_sheets_text(&mut rendered, &workbook).map_err(|e| CliError::general(e.to_string()))?;
    }
    emit(&rendered, None)
}

// ============================================================================
// doctor
// ============================================================================

fn cmd_doctor(provider: Option<String>, json: bool) -> Result<(), CliError> {
    let overrides = ConfigOverrides {
        provider,
        ..Default::default()
    };
    let config = ResolvedProviderConfig::load(&overrides).map_err(CliError::config)?;
    let diag = ProviderDiagnostics::from_resolved(&config);

    if json {
        let value = serde_json::json!({
            "schema_version": render::SCHEMA_VERSION,
            "status": diag.status.as_str(),
            "blocking_reason": diag.blocking_reason,
            "provider": diag.provider,
            "model": diag.model,
            "endpoint": diag.base_url,
            "language": diag.language,
            "timeout_secs": diag.timeout_secs,
            "key": if diag.key_present { "present" } else { "missing" },
            "key_source": diag.key_source.as_str(),
            "keychain": if diag.keychain_available { "ok" } else { "unavailable" },
            "schema_enforced": diag.schema_enforced,
            "settings_path": docdiff_config::Settings::config_path_display(),
        });
        let text = serde_json::to_string_pretty(&value).map_err(|e| CliError::general(e.to_string()))?;
        println!("{}", text);
    } else {
        print!("{}", diag);
        println!("Settings file:     {}", docdiff_config::Settings::config_path_display());
    }

    if !diag.status.is_ready() {
        return Err(CliError {
            code: EXIT_MISSING_KEY,
            message: String::new(),
            hint: Some(format!(
                "set API_KEY or {}",
                docdiff_config::provider::env_var_name(config.provider)
            )),
        });
    }
    Ok(())
}
