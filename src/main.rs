// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info, warn};
use std::io::{BufRead, Write};
use std::path::Path;

use scripttm::app_config::{self, Config};
use scripttm::app_controller::Controller;
use scripttm::export::ExportFormat;
use scripttm::memory::ClearOutcome;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for ExportFormat to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliExportFormat {
    Txt,
    Bson,
    Zst,
}

impl From<CliExportFormat> for ExportFormat {
    fn from(cli_format: CliExportFormat) -> Self {
        match cli_format {
            CliExportFormat::Txt => ExportFormat::Txt,
            CliExportFormat::Bson => ExportFormat::Bson,
            CliExportFormat::Zst => ExportFormat::Zst,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ingest, translate missing lines, export and save (default command)
    #[command(alias = "translate")]
    Run,

    /// Export the translation data without translating anything
    Export,

    /// Delete every machine translation after a backup
    ClearMachine,

    /// Show how many translations of each kind are stored
    Stats,

    /// Generate shell completions for scripttm
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
struct GlobalArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,

    /// Export format
    #[arg(short, long, value_enum, global = true)]
    format: Option<CliExportFormat>,

    /// Leave official translations out of the export
    #[arg(short, long, global = true)]
    safe_export: bool,

    /// Do not contact any translation backend
    #[arg(short, long, global = true)]
    offline: bool,
}

/// scripttm - translation memory for game scripts
///
/// Collects Japanese script lines, resolves them against the stored
/// translations, machine-translates what is missing and exports the result.
#[derive(Parser, Debug)]
#[command(name = "scripttm")]
#[command(version)]
#[command(about = "Translation memory and exporter for game script text")]
#[command(long_about = "scripttm collects Japanese script lines, resolves them against stored translations \
(manual > official > machine), translates missing lines with a local backend and exports the result.

EXAMPLES:
    scripttm                              # Ingest, translate and export using conf.json
    scripttm --format txt --safe-export   # Export text files without official translations
    scripttm --offline                    # Only use stored translations
    scripttm export --format zst          # Export only
    scripttm stats                        # Show translation counts
    scripttm clear-machine                # Drop machine translations (asks for confirmation)
    scripttm completions bash > scripttm.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED BACKENDS:
    sugoi - Sugoi offline translator (default: http://127.0.0.1:14366/)
    chat  - OpenAI-compatible chat completion server (default: http://127.0.0.1:1234/v1/chat/completions)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    global: GlobalArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(record.level()),
                now,
                Self::get_emoji_for_level(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Trace-level logger; the effective level is lowered through set_max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "scripttm", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Export) => {
            let controller = Controller::with_config(load_config(&cli.global)?)?;
            let report = controller.export_only().await?;
            if !report.is_complete() {
                error!("{} scripts failed to export", report.failures.len());
            }
            Ok(())
        }
        Some(Commands::ClearMachine) => {
            let controller = Controller::with_config(load_config(&cli.global)?)?;
            match controller.clear_machine_translations(confirm_clear)? {
                ClearOutcome::Cleared { backup, cleared } => {
                    info!("{} machine translations cleared, backup saved to {:?}", cleared, backup)
                }
                ClearOutcome::Aborted => info!("Nothing was changed"),
            }
            Ok(())
        }
        Some(Commands::Stats) => {
            let controller = Controller::with_config(load_config(&cli.global)?)?;
            let stats = controller.stats()?;
            println!("Lines:    {}", stats.lines);
            println!("Official: {}", stats.official);
            println!("Manual:   {}", stats.manual);
            println!("Machine:  {}", stats.machine);
            Ok(())
        }
        Some(Commands::Run) | None => {
            let controller = Controller::with_config(load_config(&cli.global)?)?;
            let report = controller.run().await?;
            info!(
                "{} lines processed across {} scripts, {} scripts exported",
                report.stats.lines, report.stats.scripts, report.export.scripts
            );
            if !report.export.is_complete() {
                error!("{} scripts failed to export", report.export.failures.len());
            }
            Ok(())
        }
    }
}

/// Load or create the configuration, then apply command line overrides
fn load_config(options: &GlobalArgs) -> Result<Config> {
    // If log level is set via command line, apply it immediately
    if let Some(level) = options.log_level {
        log::set_max_level(app_config::LogLevel::from(level).to_level_filter());
    }

    let config_path = &options.config_path;
    let mut config = if Path::new(config_path).exists() {
        Config::from_file(config_path)?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);
        let config = Config::default();
        config
            .save(config_path)
            .context(format!("Failed to write default config to file: {}", config_path))?;
        config
    };

    if let Some(format) = options.format {
        config.export.format = format.into();
    }
    if options.safe_export {
        config.export.safe_export = true;
    }
    if options.offline {
        config.translation.offline = true;
    }
    if let Some(level) = options.log_level {
        config.log_level = level.into();
    } else {
        log::set_max_level(config.log_level.to_level_filter());
    }

    Ok(config)
}

/// Ask the operator to type YES before destroying machine translations
fn confirm_clear() -> bool {
    warn!("This will delete every machine translation from the translation data.");
    warn!("A backup is written to the cache folder first.");
    print!("Type YES to continue: ");
    let _ = std::io::stdout().flush();

    let mut answer = String::new();
    match std::io::stdin().lock().read_line(&mut answer) {
        Ok(_) => answer.trim().eq_ignore_ascii_case("YES"),
        Err(_) => false,
    }
}
