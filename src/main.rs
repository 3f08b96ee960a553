// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow};
use log::{warn, info, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::{Path, PathBuf};
use std::io::Write;
use clap::{Args, Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use ass2srt::app_config::{self, Config};
use ass2srt::app_controller::{Controller, Task, TaskOutcome};
use ass2srt::conversion::OutputFormat;
use ass2srt::script::TextEncoding;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
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

/// CLI Wrapper for TextEncoding to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliEncoding {
    Auto,
    Utf8,
    Utf16le,
    Utf16be,
}

impl From<CliEncoding> for TextEncoding {
    fn from(cli_encoding: CliEncoding) -> Self {
        match cli_encoding {
            CliEncoding::Auto => TextEncoding::Auto,
            CliEncoding::Utf8 => TextEncoding::Utf8,
            CliEncoding::Utf16le => TextEncoding::Utf16Le,
            CliEncoding::Utf16be => TextEncoding::Utf16Be,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert ASS/SSA scripts to SRT (default command)
    Convert(ConvertArgs),

    /// Generate shell completions for ass2srt
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
struct ConvertArgs {
    /// Input scripts or directories to search for .ass/.ssa files
    #[arg(value_name = "INPUT")]
    inputs: Vec<PathBuf>,

    /// Output directory, or archive path with --archive
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Conversion dictionary: local path or http(s) URL
    #[arg(short, long)]
    dictionary: Option<String>,

    /// Pack all outputs into one ZIP archive
    #[arg(short, long)]
    archive: bool,

    /// Convert Comment: events as well
    #[arg(long)]
    keep_comments: bool,

    /// Prefix top-aligned cues with {\anN}
    #[arg(long)]
    keep_position_tags: bool,

    /// Input text encoding
    #[arg(short, long, value_enum)]
    encoding: Option<CliEncoding>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// ass2srt - ASS/SSA to SRT subtitle converter
#[derive(Parser, Debug)]
#[command(name = "ass2srt")]
#[command(version)]
#[command(about = "Convert ASS/SSA subtitle scripts to SRT")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "ass2srt converts ASS/SSA subtitle scripts to SRT, optionally rewriting text
through a conversion dictionary (for example Simplified to Traditional Chinese).

EXAMPLES:
    ass2srt episode01.ass                       # Writes episode01.srt beside the input
    ass2srt -f season1/ -o out/                 # Convert a whole directory into out/
    ass2srt -a -o season1.zip season1/          # Pack all outputs into one archive
    ass2srt -d t2s.txt episode01.ass            # Apply a local dictionary
    ass2srt -d https://example.com/t2s.txt ep.ass
    ass2srt completions bash > ass2srt.bash     # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    convert: ConvertArgs,
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

    // @returns: ANSI colour for log level
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
            let level = record.level();

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(level),
                now,
                Self::get_emoji_for_level(level),
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
    // Accept everything here; the effective level is set with set_max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "ass2srt", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Convert(args)) => run_convert(args).await,
        None => run_convert(cli.convert).await,
    }
}

/// Load the config file, creating a default one when it is missing
fn load_or_create_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        return Config::from_file(config_path);
    }

    warn!("Config file not found at '{}', creating default config.", config_path);
    let config = Config::default();
    if let Err(e) = config.save(config_path) {
        warn!("{:#}", e);
    }
    Ok(config)
}

/// Apply command line overrides on top of the file configuration
fn apply_overrides(config: &mut Config, options: &ConvertArgs) {
    if let Some(dictionary) = &options.dictionary {
        config.dictionary.source = Some(dictionary.clone());
    }
    if options.keep_comments {
        config.conversion.drop_comments = false;
    }
    if options.keep_position_tags {
        config.conversion.keep_position_tags = true;
    }
    if let Some(encoding) = &options.encoding {
        config.conversion.encoding = encoding.clone().into();
    }
    if options.archive {
        config.conversion.output_format = OutputFormat::BulkArchive;
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}

async fn run_convert(options: ConvertArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    if options.inputs.is_empty() {
        return Err(anyhow!("INPUT is required when no subcommand is specified"));
    }

    let mut config = load_or_create_config(&options.config_path)?;
    apply_overrides(&mut config, &options);
    log::set_max_level(config.log_level.to_level_filter());

    let mut controller = Controller::with_config(config.clone())?;
    controller.set_force_overwrite(options.force_overwrite);

    match config.conversion.output_format {
        OutputFormat::BulkArchive => {
            let archive_path = match &options.output {
                Some(output) if output.is_dir() => output.join(&config.bulk.archive_name),
                Some(output) => output.clone(),
                None => PathBuf::from(&config.bulk.archive_name),
            };

            let task = Task::AddFiles {
                paths: options.inputs.clone(),
                archive_path,
            };
            if let TaskOutcome::Archived { failure_count, .. } = controller.dispatch(task).await? {
                if failure_count > 0 {
                    warn!("{} files could not be converted, see the issues log", failure_count);
                }
            }
        }
        OutputFormat::Srt => {
            let written = controller.convert_each(&options.inputs, options.output.as_deref()).await?;
            info!("{} subtitle files written", written);
        }
    }

    Ok(())
}
