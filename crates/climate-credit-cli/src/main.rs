mod commands;
mod config;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::assess::{AssessArgs, StageArgs};
use commands::lookup::{GradeArgs, StressArgs};

/// Climate-scenario stressed credit loss assessment
#[derive(Parser)]
#[command(
    name = "ccr",
    version,
    about = "Climate-scenario stressed credit loss assessment",
    long_about = "Computes PD, LGD, EAD and expected loss for loan and investment \
                  portfolios under baseline, orderly, disorderly and no-policy \
                  climate scenarios, using reference tables from a data directory."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Reference data directory (overrides the config file)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// YAML or JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug detail to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Assess a portfolio: PD, LGD, EAD and summary tables per horizon
    Assess(AssessArgs),
    /// Probability of default per client and scenario
    Pd(StageArgs),
    /// Loss given default per client and scenario
    Lgd(StageArgs),
    /// Exposure at default per client
    Ead(StageArgs),
    /// Stressed collateral value (and revenue impact) for a region
    Stress(StressArgs),
    /// Sovereign/industry letter grade and rating notch shifts
    Grade(GradeArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

/// Global options shared by every command.
pub struct GlobalOpts {
    pub data_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let global = GlobalOpts {
        data_dir: cli.data_dir,
        config: cli.config,
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Assess(args) => commands::assess::run_assess(&global, args),
        Commands::Pd(args) => commands::assess::run_pd(&global, args),
        Commands::Lgd(args) => commands::assess::run_lgd(&global, args),
        Commands::Ead(args) => commands::assess::run_ead(&global, args),
        Commands::Stress(args) => commands::lookup::run_stress(&global, args),
        Commands::Grade(args) => commands::lookup::run_grade(&global, args),
        Commands::Version => {
            println!("ccr {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
