use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use deckforge::cli::commands::generate::GenerateOptions;
use deckforge::config::OutputFormat;

#[derive(Parser)]
#[command(name = "deckforge")]
#[command(
    version,
    about = "Research-backed strategy deck generator for business problems"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a deck for a business problem
    Generate {
        #[arg(long, short, help = "Problem statement", conflicts_with = "problem_file")]
        problem: Option<String>,
        #[arg(long, help = "Read the problem statement from a file")]
        problem_file: Option<PathBuf>,
        #[arg(long, short, help = "Client name shown on the cover")]
        client: String,
        #[arg(long, short, help = "Output directory for deck bundles")]
        output: Option<PathBuf>,
        #[arg(long, help = "LLM provider (gemini, openai, ollama)")]
        provider: Option<String>,
        #[arg(long, help = "Model to use")]
        model: Option<String>,
        #[arg(
            short = 'f',
            long,
            value_parser = clap::value_parser!(OutputFormat),
            help = "Stdout format: md, json"
        )]
        format: Option<OutputFormat>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(short = 'g', long, help = "Show global config file only")]
        global: bool,
        #[arg(
            short = 'f',
            long,
            default_value = "toml",
            help = "Output format: toml, json"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Write a default configuration file
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mdeckforge encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Backtrace with RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "deckforge=debug,info"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Generate {
            problem,
            problem_file,
            client,
            output,
            provider,
            model,
            format,
        } => {
            deckforge::cli::commands::generate::run(GenerateOptions {
                problem,
                problem_file,
                client,
                output,
                provider,
                model,
                format,
                quiet: cli.quiet,
            })?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { global, format } => {
                deckforge::cli::commands::config::show(global, &format)?;
            }
            ConfigAction::Path => {
                deckforge::cli::commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                deckforge::cli::commands::config::init(global, force)?;
            }
        },
    }

    Ok(())
}
