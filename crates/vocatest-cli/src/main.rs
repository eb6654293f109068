//! vocatest CLI, an adaptive English vocabulary test in the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod config;

#[derive(Parser)]
#[command(
    name = "vocatest",
    version,
    about = "Adaptive English vocabulary size test"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take the vocabulary test
    Take {
        /// Question bank TOML file
        #[arg(long)]
        bank: Option<PathBuf>,

        /// Display name (2-20 characters); asked for if omitted
        #[arg(long)]
        name: Option<String>,

        /// Seed for reproducible question selection
        #[arg(long)]
        seed: Option<u64>,

        /// JSON Lines file finished tests are appended to
        #[arg(long)]
        results: Option<PathBuf>,

        /// Also write the full results as JSON to this file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Also write the plain-text report to this file
        #[arg(long)]
        report: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check a question bank and report data-quality problems
    Validate {
        /// Question bank TOML file
        #[arg(long)]
        bank: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show past test results
    History {
        /// JSON Lines results file
        #[arg(long)]
        results: Option<PathBuf>,

        /// Show only the most recent N results
        #[arg(long)]
        limit: Option<usize>,

        /// Print the records as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config and sample question bank
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("vocatest=info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Take {
            bank,
            name,
            seed,
            results,
            output,
            report,
            config,
        } => commands::take::execute(commands::take::TakeOptions {
            bank,
            name,
            seed,
            results,
            output,
            report,
            config,
        }),
        Commands::Validate { bank, config } => commands::validate::execute(bank, config),
        Commands::History {
            results,
            limit,
            json,
            config,
        } => commands::history::execute(results, limit, json, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
