// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use modlang::app_config::{self, Config};
use modlang::app_controller::Controller;
use modlang::dictionary::PersonalDictionary;
use modlang::pack_builder::OutputMode;

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

/// CLI Wrapper for OutputMode to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliOutputMode {
    Directory,
    Archive,
}

impl From<CliOutputMode> for OutputMode {
    fn from(mode: CliOutputMode) -> Self {
        match mode {
            CliOutputMode::Directory => OutputMode::Directory,
            CliOutputMode::Archive => OutputMode::Archive,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a translation resource pack (default command)
    Build(BuildArgs),

    /// Manage the personal dictionary
    Dict {
        #[command(subcommand)]
        action: DictAction,
    },

    /// Generate shell completions for modlang
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
enum DictAction {
    /// Add or replace a translation
    Add {
        /// Text key, e.g. item.examplemod.ruby
        key: String,
        /// Translation
        translation: String,
        /// Original text, enables lookup by text for other keys
        #[arg(short, long, default_value = "")]
        origin: String,
    },

    /// Remove a translation
    Remove {
        /// Text key
        key: String,
    },

    /// List all translations
    List,
}

#[derive(Parser, Debug, Default, Clone)]
struct BuildArgs {
    /// Directory containing mod archives
    #[arg(short, long)]
    mods_dir: Option<PathBuf>,

    /// Directory the pack is written into
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Directory of third-party resource packs
    #[arg(short, long)]
    packs_dir: Option<PathBuf>,

    /// Community dictionary store
    #[arg(long)]
    community_dict: Option<PathBuf>,

    /// Target locale (e.g., 'zh_cn', 'zh_tw')
    #[arg(short, long)]
    target_locale: Option<String>,

    /// Machine-translate keys no dictionary could resolve
    #[arg(long)]
    translate: bool,

    /// Write a directory or a zip archive
    #[arg(long, value_enum)]
    mode: Option<CliOutputMode>,
}

/// modlang - translation packs for game mods
///
/// Extracts language files from mod archives, resolves every text key against
/// bundled translations, dictionaries and third-party packs, optionally
/// machine-translates the rest, and writes a resource pack whose files keep
/// the exact layout of the originals.
#[derive(Parser, Debug)]
#[command(name = "modlang")]
#[command(version)]
#[command(about = "Translation resource packs for game mods")]
#[command(long_about = "modlang builds translation resource packs for game mods.

EXAMPLES:
    modlang                                    # Build using default config
    modlang build -m ./mods -o ./out           # Explicit input and output
    modlang build --translate                  # Machine-translate the remainder
    modlang dict add item.mod.ruby 红宝石 -o Ruby # Add a personal translation
    modlang dict list                          # Show personal translations
    modlang completions bash > modlang.bash    # Generate bash completions

CONFIGURATION:
    Configuration is stored in modlang.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically. API keys may also be supplied through the
    MODLANG_API_KEYS environment variable (comma separated).")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "modlang.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
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
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
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

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with trace level as ceiling; the effective
    // level is adjusted after loading the config
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Some(cmd_log_level) = &cli.log_level {
        log::set_max_level(level_filter(&cmd_log_level.clone().into()));
    }

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "modlang", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Dict { action }) => {
            let config = load_config(&cli.config_path, cli.log_level.as_ref())?;
            run_dict(&config, action)
        }
        Some(Commands::Build(args)) => run_build(&cli.config_path, cli.log_level.as_ref(), args).await,
        None => run_build(&cli.config_path, cli.log_level.as_ref(), BuildArgs::default()).await,
    }
}

// @loads: Config from disk, creating a default file when missing
fn load_config(config_path: &str, log_level: Option<&CliLogLevel>) -> Result<Config> {
    let mut config = if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;
        config
    };

    match log_level {
        Some(level) => config.log_level = level.clone().into(),
        None => log::set_max_level(level_filter(&config.log_level)),
    }

    Ok(config)
}

async fn run_build(config_path: &str, log_level: Option<&CliLogLevel>, args: BuildArgs) -> Result<()> {
    let mut config = load_config(config_path, log_level)?;

    // Override config with CLI options if provided
    if let Some(mods_dir) = args.mods_dir {
        config.paths.mods_dir = mods_dir;
    }
    if let Some(output_dir) = args.output_dir {
        config.paths.output_dir = output_dir;
    }
    if let Some(packs_dir) = args.packs_dir {
        config.paths.packs_dir = Some(packs_dir);
    }
    if let Some(community_dict) = args.community_dict {
        config.paths.community_dictionary = Some(community_dict);
    }
    if let Some(target_locale) = args.target_locale {
        config.target_locale = modlang::language_utils::normalize_locale(&target_locale);
    }
    if args.translate {
        config.translation.enabled = true;
    }
    if let Some(mode) = args.mode {
        config.pack.output_mode = mode.into();
    }

    config.validate().context("Configuration validation failed")?;

    let controller = Controller::with_config(config)?;

    // Ctrl-C stops outstanding translation batches; dictionary results are still written
    let cancel = controller.cancellation();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling outstanding requests");
            cancel.cancel();
        }
    });

    let report = controller.run().await;
    if report.success {
        info!("Success: {}", report.message);
        Ok(())
    } else {
        Err(anyhow!(report.message))
    }
}

fn run_dict(config: &Config, action: DictAction) -> Result<()> {
    let path = &config.paths.personal_dictionary;
    let mut dictionary = PersonalDictionary::load(path)
        .with_context(|| format!("Failed to load personal dictionary: {:?}", path))?;

    match action {
        DictAction::Add {
            key,
            translation,
            origin,
        } => {
            dictionary.insert(&key, &origin, &translation)?;
            info!("Saved '{}' = '{}'", key, translation);
        }
        DictAction::Remove { key } => {
            if dictionary.remove(&key)? {
                info!("Removed '{}'", key);
            } else {
                warn!("No personal translation for '{}'", key);
            }
        }
        DictAction::List => {
            let mut stdout = std::io::stdout();
            for entry in dictionary.entries() {
                if entry.origin.is_empty() {
                    writeln!(stdout, "{}\t{}", entry.key, entry.translation)?;
                } else {
                    writeln!(stdout, "{}\t{}\t{}", entry.key, entry.translation, entry.origin)?;
                }
            }
            info!("{} personal translation(s) in {:?}", dictionary.len(), path);
        }
    }

    Ok(())
}
