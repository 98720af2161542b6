// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, Context};
use log::{info, warn, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::{Path, PathBuf};
use std::io::Write;
use clap::{Args, Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use modlocai::app_config::{self, Config, TranslationProvider};
use modlocai::app_controller::Controller;
use modlocai::file_utils::FileManager;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Ollama,
    OpenAI,
    Anthropic,
    LMStudio,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::Anthropic => TranslationProvider::Anthropic,
            CliTranslationProvider::LMStudio => TranslationProvider::LMStudio,
        }
    }
}

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

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate every plugin (default command)
    Translate(RunArgs),

    /// Translate only plugins changed since the last update run
    Update(RunArgs),

    /// Generate shell completions for modlocai
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    /// Mods directory, or a plugin file inside it (defaults to ./mods)
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Mod manager profile (modlist.txt) used to resolve plugins by load order
    #[arg(long, value_name = "MODLIST")]
    profile: Option<PathBuf>,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Source language code (e.g., 'en')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'ja')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Number of plugins processed at the same time
    #[arg(short = 'j', long)]
    max_parallel: Option<usize>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// modlocai - Mod Localization with AI
///
/// Extracts the strings of game mod plugins, translates them with an LLM in
/// token-bounded batches and writes Dynamic String Distributor JSON files.
#[derive(Parser, Debug)]
#[command(name = "modlocai")]
#[command(version)]
#[command(about = "AI-powered game mod localization tool")]
#[command(long_about = "modlocai extracts translatable strings from .esp/.esm/.esl plugins, translates them using AI providers and writes DSD JSON.

EXAMPLES:
    modlocai                                     # Translate every plugin under ./mods
    modlocai D:/MO2/mods                         # Translate plugins of another mods directory
    modlocai update                              # Only plugins changed since the last update
    modlocai --profile profiles/Default/modlist.txt D:/MO2/mods
    modlocai -p ollama -m qwen2.5:7b -j 2        # Use a local model with two workers
    modlocai completions bash > modlocai.bash    # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    openai    - OpenAI API (requires API key or OPENAI_API_KEY)
    anthropic - Anthropic API (requires API key or ANTHROPIC_API_KEY)
    ollama    - Local Ollama server
    lmstudio  - LM Studio local server (OpenAI-compatible on http://localhost:1234/v1)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

/// Which plugins a run processes
#[derive(Debug, Clone, Copy, PartialEq)]
enum RunMode {
    Full,
    Update,
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
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
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
        metadata.level() <= self.level && metadata.level() <= log::max_level()
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
    // Initialize the logger once with info level by default
    // The level is updated after the config is loaded
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "modlocai", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Translate(args)) => run(args, RunMode::Full).await,
        Some(Commands::Update(args)) => run(args, RunMode::Update).await,
        None => run(cli.run, RunMode::Full).await,
    }
}

/// Load the configuration, creating a default file when missing, and apply CLI overrides
fn load_config(options: &RunArgs) -> Result<Config> {
    let config_path = Path::new(&options.config_path);
    let mut config = if config_path.exists() {
        Config::from_file(config_path)?
    } else {
        warn!("Config file not found at '{}', creating default config.", options.config_path);
        let config = Config::default();
        config.save(config_path)?;
        config
    };

    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }

    if let Some(model) = &options.model {
        config.translation.active_provider_config_mut().model = model.clone();
    }

    if let Some(source_lang) = &options.source_language {
        config.source_language = source_lang.clone();
    }

    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }

    if let Some(max_parallel) = options.max_parallel {
        config.general.max_parallel = max_parallel;
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    Ok(config)
}

async fn run(options: RunArgs, mode: RunMode) -> Result<()> {
    // Apply a CLI log level before anything else logs
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let config = load_config(&options)?;
    config.validate()
        .context("Configuration validation failed")?;
    log::set_max_level(config.log_level.to_level_filter());

    let default_mods_dir = std::env::current_dir()
        .context("Failed to determine the current directory")?
        .join("mods");
    let mods_root = FileManager::resolve_input_dir(options.input_path.as_deref(), &default_mods_dir);
    info!("Mods directory: {:?}", mods_root);

    let plugins = Controller::discover_plugins(&mods_root, options.profile.as_deref())?;
    info!("Found {} plugins", plugins.len());

    let controller = Controller::with_config(config)?;
    let summary = match mode {
        RunMode::Full => controller.run_full(plugins).await?,
        RunMode::Update => controller.run_update(plugins).await?,
    };

    if !summary.failed.is_empty() {
        warn!("{} plugins failed; see the log above for details", summary.failed.len());
    }

    Ok(())
}
