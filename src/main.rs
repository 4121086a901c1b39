// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use vault2html::app_config::{self, Config};
use vault2html::file_utils::FileManager;
use vault2html::{Controller, renderer};

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
    /// Convert the configured vault to HTML (default command)
    Convert,

    /// Create the configuration file (first-time setup)
    Init(InitArgs),

    /// Generate shell completions for vault2html
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Default)]
struct InitArgs {
    /// Answer yes when the destination folder is not empty
    #[arg(short, long)]
    yes: bool,

    /// Do not require a .obsidian folder inside the vault
    #[arg(long)]
    no_vault_check: bool,
}

/// vault2html - convert a note vault into standalone HTML pages
#[derive(Parser, Debug)]
#[command(name = "vault2html")]
#[command(version)]
#[command(about = "Convert a note vault into standalone HTML pages")]
#[command(long_about = "vault2html walks a vault of Markdown notes, rewrites wiki links, media embeds,
highlights and video links into portable Markdown, and renders every note to a
standalone HTML page with pandoc, mirroring the folder structure.

EXAMPLES:
    vault2html init                               # First-time setup (interactive)
    vault2html init --vault ~/Vault --destination ~/Site
    vault2html                                    # Convert using config.json
    vault2html -j 8 --log-level debug             # Eight documents at a time, verbose
    vault2html completions bash > vault2html.bash # Generate bash completions

CONFIGURATION:
    Configuration is stored in config.json by default. If it doesn't exist,
    first-time setup runs and the next invocation starts the conversion.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, default_value = "config.json", global = true)]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,

    /// Vault folder (overrides the configuration)
    #[arg(long, global = true)]
    vault: Option<String>,

    /// Destination folder (overrides the configuration)
    #[arg(long, global = true)]
    destination: Option<String>,

    /// Number of documents converted at the same time
    #[arg(short, long)]
    jobs: Option<usize>,
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

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
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
                "\x1B[{}m{} {:<5} {}\x1B[0m",
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

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts everything; the effective level is set through max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Some(level) = &cli.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    match &cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(*shell, &mut cmd, "vault2html", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Init(args)) => run_setup(&cli, args),
        Some(Commands::Convert) | None => {
            if !cli.config_path.exists() {
                return run_setup(&cli, &InitArgs::default());
            }
            run_convert(&cli).await
        }
    }
}

async fn run_convert(options: &CommandLineOptions) -> Result<()> {
    let mut config = Config::load(&options.config_path)?;

    // Override config with CLI options if provided
    if let Some(vault) = &options.vault {
        config.vault_folder = FileManager::remove_trailing_slash(vault);
    }
    if let Some(destination) = &options.destination {
        config.destination_folder = FileManager::remove_trailing_slash(destination);
    }
    if let Some(jobs) = options.jobs {
        config.concurrent_documents = jobs;
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    } else {
        log::set_max_level(config.log_level.to_level_filter());
    }

    config.validate().context("Configuration validation failed")?;

    info!("Loaded configuration from {}", options.config_path.display());
    info!("Vault: {}", config.vault_folder);
    info!("Destination folder: {}", config.destination_folder);
    if config.exclude_frontmatter_properties.is_empty() {
        info!("No frontmatter exclusion properties configured.");
    } else {
        info!(
            "Files with these frontmatter properties set to true will be excluded: {}",
            config.exclude_frontmatter_properties.join(", ")
        );
    }

    if !renderer::check_renderer_installed(&config.renderer.program) {
        bail!("Renderer '{}' is not available", config.renderer.program);
    }

    if FileManager::setup_template(config.template_path())? {
        info!("Created user template file at {}", config.template_file);
        info!("You can customize this file to change the HTML output appearance.");
    }

    let controller = Controller::with_config(config);
    let summary = controller.run_folder().await?;

    if summary.failed > 0 {
        warn!(
            "{} document(s) failed, see {}",
            summary.failed,
            controller.config().error_log_file
        );
    }
    Ok(())
}

/// First-time setup: ask for the two folders and save a default configuration
fn run_setup(options: &CommandLineOptions, args: &InitArgs) -> Result<()> {
    let rule = "=".repeat(80);
    println!("\n{}\nFIRST-TIME SETUP\n{}", rule, rule);
    println!("Setting up configuration at {}", options.config_path.display());

    let stdin = std::io::stdin();
    let mut input = stdin.lock();

    let vault = match &options.vault {
        Some(vault) => vault.clone(),
        None => prompt(&mut input, "Enter source path to your Obsidian vault: ")?,
    };
    let vault = FileManager::remove_trailing_slash(&vault);
    if vault.is_empty() || !Path::new(&vault).is_dir() {
        bail!("Vault folder does not exist: '{}'", vault);
    }
    if !args.no_vault_check && !FileManager::contains_folder(&vault, ".obsidian") {
        bail!("No '.obsidian' folder found in the specified vault, please check your path.");
    }

    let destination = match &options.destination {
        Some(destination) => destination.clone(),
        None => prompt(&mut input, "Enter destination folder for generated HTML: ")?,
    };
    let destination = FileManager::remove_trailing_slash(&destination);
    if destination.is_empty() {
        bail!("Destination folder must not be empty");
    }

    if !args.yes && !FileManager::folder_empty(&destination)? {
        let answer = prompt(
            &mut input,
            "Warning: The destination folder is not empty. Do you want to continue? (y/n): ",
        )?;
        if !answer.eq_ignore_ascii_case("y") {
            return Err(anyhow!("Operation cancelled by the user."));
        }
    }

    let config = Config::new(vault, destination);
    config.save(&options.config_path)?;

    println!("\nConfiguration saved to '{}':", options.config_path.display());
    println!("  • Vault: {}", config.vault_folder);
    println!("  • Destination folder: {}", config.destination_folder);
    println!("  • Excluded folders: {}", config.excluded_folders.join(", "));
    println!("\nYou can add e.g. 'private' to exclude_frontmatter_properties");
    println!("to skip files with private: true in their frontmatter.");
    println!("\nRun vault2html again to start the conversion.");
    Ok(())
}

fn prompt<R: BufRead>(input: &mut R, message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout().flush()?;
    let mut line = String::new();
    input.read_line(&mut line).context("Failed to read from stdin")?;
    Ok(line.trim().to_string())
}
