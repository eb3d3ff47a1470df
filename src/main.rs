// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info};
use std::io::Write;
use std::path::PathBuf;

use ytautosub::app_config::{self, Config, OutputFormat};
use ytautosub::app_controller::{Controller, RunOutcome};

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

/// CLI Wrapper for OutputFormat to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    Srt,
    Json,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(cli_format: CliOutputFormat) -> Self {
        match cli_format {
            CliOutputFormat::Srt => OutputFormat::Srt,
            CliOutputFormat::Json => OutputFormat::Json,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert srv3 captions to subtitles (default command)
    Convert(ConvertArgs),

    /// Generate shell completions for ytautosub
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Input .srv3 file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Output file (single-file mode only; defaults to the input with a new extension)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<CliOutputFormat>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: PathBuf,

    /// Environment file with GEMINI_* and DEBUG_* settings
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,

    /// Gemini model name
    #[arg(short, long)]
    model: Option<String>,

    /// Sampling temperature (0.0 - 2.0)
    #[arg(long)]
    temperature: Option<f32>,

    /// Maximum output tokens per request
    #[arg(long)]
    max_output_tokens: Option<u32>,

    /// Save prompts and responses of every batch
    #[arg(long)]
    debug: bool,

    /// Directory for debug files
    #[arg(long, value_name = "DIR")]
    debug_dir: Option<PathBuf>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// ytautosub - YouTube auto-captions to readable subtitles
///
/// Converts YouTube timed-text (srv3) captions into sentence-shaped SRT
/// subtitles, using Google Gemini to regroup the words.
#[derive(Parser, Debug)]
#[command(name = "ytautosub")]
#[command(version)]
#[command(about = "Convert YouTube srv3 auto-captions into readable subtitles")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "ytautosub regroups the words of YouTube timed-text captions into natural subtitle blocks.

EXAMPLES:
    ytautosub talk.srv3                         # Write talk.srt next to the input
    ytautosub -f talk.srv3                      # Force overwrite an existing talk.srt
    ytautosub talk.srv3 -o out/talk.srt         # Choose the output path
    ytautosub --format json talk.srv3           # Write talk.json instead
    ytautosub --debug talk.srv3                 # Keep prompts and responses in ./debug
    ytautosub /captions/                        # Convert every .srv3 file in a directory
    ytautosub completions bash > ytautosub.bash # Generate bash completions

CONFIGURATION:
    Settings are layered: defaults, conf.json (if present), .env, the process
    environment, then command-line flags. GEMINI_API_KEY is required.")]
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
        log::set_boxed_logger(Box::new(CustomLogger::new(level)))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and emoji for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "❌ "),
            Level::Warn => ("1;33", "🚧 "),
            Level::Info => ("1;32", " "),
            Level::Debug => ("1;36", "🔍 "),
            Level::Trace => ("1;35", "📋 "),
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
            let (color, emoji) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", color, now, emoji, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() {
    // The max level is lowered or raised once the configuration is known
    if let Err(e) = CustomLogger::init(LevelFilter::Trace) {
        eprintln!("Failed to initialize logger: {}", e);
    }
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    let result = match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "ytautosub", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Convert(args)) => run_convert(args).await,
        None => run_convert(cli.convert).await,
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

/// Apply command-line overrides on top of the loaded configuration
fn apply_cli_overrides(config: &mut Config, options: &ConvertArgs) {
    if let Some(model) = &options.model {
        config.reshaping.model = model.clone();
    }
    if let Some(temperature) = options.temperature {
        config.reshaping.temperature = temperature;
    }
    if let Some(max_output_tokens) = options.max_output_tokens {
        config.reshaping.max_output_tokens = max_output_tokens;
    }
    if let Some(format) = options.format {
        config.output_format = format.into();
    }
    if options.debug {
        config.debug.enabled = true;
    }
    if let Some(dir) = &options.debug_dir {
        config.debug.dir = dir.clone();
    }
    if let Some(log_level) = options.log_level {
        config.log_level = log_level.into();
    } else if config.debug.enabled {
        config.log_level = app_config::LogLevel::Debug;
    }
}

async fn run_convert(options: ConvertArgs) -> Result<()> {
    if let Some(log_level) = options.log_level {
        log::set_max_level(app_config::LogLevel::from(log_level).to_level_filter());
    }

    let input_path = options
        .input_path
        .clone()
        .ok_or_else(|| anyhow!("INPUT_PATH is required"))?;

    let mut config = Config::load(Some(&options.config_path), Some(&options.env_file))
        .context("Failed to load configuration")?;
    apply_cli_overrides(&mut config, &options);
    log::set_max_level(config.log_level.to_level_filter());

    config.validate().context("Configuration validation failed")?;

    let controller = Controller::with_config(config);

    if input_path.is_file() {
        let outcome = controller
            .run(input_path, options.output.clone(), options.force_overwrite)
            .await?;
        if let RunOutcome::Skipped { output } = outcome {
            info!("Nothing to do, {} already exists", output.display());
        }
    } else if input_path.is_dir() {
        if options.output.is_some() {
            return Err(anyhow!("--output cannot be used with a directory input"));
        }
        controller
            .run_folder(input_path, options.force_overwrite)
            .await?;
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", input_path));
    }

    Ok(())
}
