// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use twbtrans::app_config::{self, Config, TranslationProvider};
use twbtrans::app_controller::Controller;
use twbtrans::file_utils::FileManager;
use twbtrans::language_utils;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Anthropic,
    Ollama,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Anthropic => TranslationProvider::Anthropic,
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
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
    /// Translate Tableau workbooks (default command)
    Translate {
        /// Workbook (.twb) or directory of workbooks to translate
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,

        #[command(flatten)]
        options: TranslateOptions,
    },

    /// Generate shell completions for twbtrans
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
struct TranslateOptions {
    /// Target language, as a name or ISO code (e.g. 'English', 'fr')
    #[arg(short = 'l', long = "language")]
    target_language: Option<String>,

    /// Output file (single workbook only); defaults to <stem>_<CODE>.twb next to the input
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Anthropic API key
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// List the texts that would be translated without calling a provider or writing files
    #[arg(long)]
    dry_run: bool,
}

/// twbtrans - translate the text of Tableau workbooks with AI
///
/// Worksheet and dashboard names, captions, aliases and text runs are sent to a
/// translation provider and written back into a copy of the workbook. Every
/// other byte of the file is left as it was.
#[derive(Parser, Debug)]
#[command(name = "twbtrans")]
#[command(version)]
#[command(about = "AI-powered Tableau workbook translation tool")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "twbtrans translates the user-facing text of Tableau workbooks (.twb) using AI providers.

EXAMPLES:
    twbtrans sales.twb                          # Translate into English using conf.json
    twbtrans -l fr sales.twb                    # Translate into French (writes sales_FR.twb)
    twbtrans -o out/sales_en.twb sales.twb      # Write to an explicit output path
    twbtrans -p ollama -m llama3 sales.twb      # Use a local Ollama model
    twbtrans --dry-run sales.twb                # Show what would be translated
    twbtrans --log-level debug /workbooks/      # Translate a whole directory
    twbtrans completions bash > twbtrans.bash   # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    anthropic - Anthropic Claude API (requires API key, or ANTHROPIC_API_KEY)
    ollama    - Local Ollama server")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Workbook (.twb) or directory of workbooks to translate
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    #[command(flatten)]
    options: TranslateOptions,
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

    // @returns: ANSI colour for log level
    fn color_for_level(level: Level) -> &'static str {
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
            let color = Self::color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:<5} {}\x1B[0m",
                color,
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize the logger with the most verbose level; the effective level
    // is lowered through log::set_max_level once the config is known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "twbtrans", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Translate { input_path, options }) => run_translate(input_path, options).await,
        None => {
            let input_path = cli
                .input_path
                .ok_or_else(|| anyhow!("INPUT_PATH is required when no subcommand is specified"))?;
            run_translate(input_path, cli.options).await
        }
    }
}

/// Apply command line overrides on top of the loaded configuration
fn apply_overrides(config: &mut Config, options: &TranslateOptions) {
    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }

    if let Some(model) = &options.model {
        config.translation.active_provider_config_mut().model = model.clone();
    }

    if let Some(api_key) = options.api_key.as_ref().filter(|key| !key.trim().is_empty()) {
        if config.translation.provider == TranslationProvider::Anthropic {
            config.translation.active_provider_config_mut().api_key = api_key.trim().to_string();
        }
    }

    if let Some(target_language) = &options.target_language {
        config.target_language = target_language.clone();
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}

async fn run_translate(input_path: PathBuf, options: TranslateOptions) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(config_log_level.to_level_filter());
    }

    // Load or create configuration
    let mut config = Config::load_or_create(&options.config_path)?;
    apply_overrides(&mut config, &options);
    log::set_max_level(config.log_level.to_level_filter());

    if options.dry_run {
        config.rule_set().context("Configuration validation failed")?;
        return run_dry(&config, &input_path);
    }

    // Validate the configuration after loading and overriding
    config.validate().context("Configuration validation failed")?;

    let controller = Controller::with_config(config)?;

    if input_path.is_dir() {
        if options.output.is_some() {
            return Err(anyhow!("--output can only be used with a single workbook"));
        }
        controller.run_folder(input_path).await?;
        return Ok(());
    }

    let outcome = controller
        .run(input_path, options.output)
        .await
        .map_err(|e| anyhow!("{:?}: {}", e.kind(), e))?;

    println!("{}", outcome.report);
    println!("Output:              {}", outcome.output.display());
    println!("Backup:              {}", outcome.backup.display());
    println!("Duration:            {}", Controller::format_duration(outcome.duration));

    Ok(())
}

fn run_dry(config: &Config, input_path: &Path) -> Result<()> {
    let controller = Controller::with_config(config.clone())?;

    let workbooks = if input_path.is_dir() {
        FileManager::find_workbooks(input_path, &language_utils::file_code(&config.target_language))?
    } else {
        vec![input_path.to_path_buf()]
    };

    for workbook in workbooks {
        info!("Dry run for {:?}", workbook);
        let report = controller
            .dry_run(&workbook)
            .map_err(|e| anyhow!("{:?}: {}", e.kind(), e))?;
        println!("{}", report);
    }

    Ok(())
}
