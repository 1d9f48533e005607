// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, warn};
use std::io::Write;
use std::path::{Path, PathBuf};

use subtrans::app_config::{Config, LogLevel, ProviderKind};
use subtrans::app_controller::Controller;
use subtrans::subtitle_processor::{OutputMode, TranslationPosition};

/// CLI wrapper for ProviderKind to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliProvider {
    Google,
    Volcengine,
    Aliyun,
    Tencent,
}

impl From<CliProvider> for ProviderKind {
    fn from(cli_provider: CliProvider) -> Self {
        match cli_provider {
            CliProvider::Google => ProviderKind::Google,
            CliProvider::Volcengine => ProviderKind::Volcengine,
            CliProvider::Aliyun => ProviderKind::Aliyun,
            CliProvider::Tencent => ProviderKind::Tencent,
        }
    }
}

/// CLI wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

/// Placement of the translation in bilingual output
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliPosition {
    Above,
    Below,
}

impl From<CliPosition> for TranslationPosition {
    fn from(cli_position: CliPosition) -> Self {
        match cli_position {
            CliPosition::Above => TranslationPosition::Above,
            CliPosition::Below => TranslationPosition::Below,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a subtitle file, or every subtitle file in a directory
    Translate(TranslateArgs),

    /// Generate shell completions for subtrans
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Input subtitle file (.srt, .vtt, .ass, .ssa) or directory
    #[arg(value_name = "INPUT")]
    input_path: PathBuf,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliProvider>,

    /// Source language code (e.g., 'en', 'ja'); 'auto' detects it
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'zh-CN', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Directory for the translated file (defaults to the input's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Keep the original text next to the translation
    #[arg(long)]
    bilingual: bool,

    /// Where the translation goes in bilingual output
    #[arg(long, value_enum, requires = "bilingual")]
    position: Option<CliPosition>,

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

/// subtrans - subtitle translation through machine translation APIs
#[derive(Parser, Debug)]
#[command(name = "subtrans")]
#[command(version)]
#[command(about = "Subtitle translation through machine translation APIs")]
#[command(long_about = "subtrans translates SRT, WebVTT and ASS subtitles with Google, Volcengine, Aliyun or Tencent machine translation.

EXAMPLES:
    subtrans translate movie.srt                          # Translate using default config
    subtrans translate -f movie.srt                       # Force overwrite existing files
    subtrans translate -p tencent -t zh-CN movie.srt      # Use a specific provider and target
    subtrans translate --bilingual --position above a.ass # Keep the original under the translation
    subtrans translate -l debug /movies/                  # Process a whole directory
    subtrans completions bash > subtrans.bash             # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically. Credentials may also come from the environment
    (GOOGLE_API_KEY, VOLCENGINE_ACCESS_KEY, ALIYUN_ACCESS_KEY_ID, TENCENT_SECRET_ID, ...).")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation, filtered by the global max level
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour and tag for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let now = chrono::Local::now().format("%H:%M:%S.%3f");
        let (colour, tag) = Self::style_for_level(record.level());
        let _ = writeln!(std::io::stderr(), "{}{} {} {}\x1B[0m", colour, now, tag, record.args());
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the config says otherwise
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "subtrans", &mut std::io::stdout());
            Ok(())
        }
        Commands::Translate(args) => run_translate(args).await,
    }
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    if let Some(level) = options.log_level {
        log::set_max_level(LogLevel::from(level).to_level_filter());
    }

    let mut config = load_or_create_config(&options.config_path)?;
    config.apply_env_overrides();
    apply_cli_overrides(&mut config, &options);

    config.validate().context("Configuration validation failed")?;
    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::with_config(config)?;

    if options.input_path.is_file() {
        let output_dir = match &options.output_dir {
            Some(dir) => dir.clone(),
            None => options
                .input_path
                .parent()
                .unwrap_or(Path::new("."))
                .to_path_buf(),
        };
        controller
            .run(&options.input_path, &output_dir, options.force_overwrite)
            .await?;
    } else if options.input_path.is_dir() {
        if options.output_dir.is_some() {
            warn!("--output-dir is ignored for directories, translations are written next to each file");
        }
        controller
            .run_folder(&options.input_path, options.force_overwrite)
            .await?;
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", options.input_path));
    }

    Ok(())
}

/// Read `config_path`, or write a default configuration there when it is missing
fn load_or_create_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        let json = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to open config file: {}", config_path))?;
        return Config::from_json(&json)
            .with_context(|| format!("Failed to parse config file: {}", config_path));
    }

    warn!("Config file not found at '{}', creating default config.", config_path);
    let config = Config::default();
    let config_json = serde_json::to_string_pretty(&config)
        .context("Failed to serialize default config to JSON")?;
    std::fs::write(config_path, config_json)
        .with_context(|| format!("Failed to write default config to file: {}", config_path))?;
    Ok(config)
}

fn apply_cli_overrides(config: &mut Config, options: &TranslateArgs) {
    if let Some(provider) = options.provider {
        config.provider = provider.into();
    }
    if let Some(source) = &options.source_language {
        config.source_language = source.clone();
    }
    if let Some(target) = &options.target_language {
        config.target_language = target.clone();
    }
    if options.bilingual {
        config.output.mode = OutputMode::OriginalAndTranslation;
    }
    if let Some(position) = options.position {
        config.output.position = position.into();
    }
    if let Some(level) = options.log_level {
        config.log_level = level.into();
    }
}
