mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use commands::metrics::MetricsArgs;

/// SaaS subscription-economics metrics from a customer revenue table
#[derive(Parser)]
#[command(
    name = "saasm",
    version,
    about = "SaaS subscription-economics metrics from a customer revenue table",
    long_about = "Computes a month-over-month MRR bridge, ARR growth, TTM and cohort \
                  dollar retention, upgrade/downgrade/churn statistics, a customer \
                  bridge, and net-loss payback ratios from per-customer monthly \
                  revenue. Set RUST_LOG=debug to trace the pipeline on stderr."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute every metric series over the month axis
    Metrics(MetricsArgs),
    /// Headline metrics for the latest month
    Snapshot(MetricsArgs),
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

fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    // A subscriber may already be installed when embedded; keep going.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Metrics(args) => commands::metrics::run_metrics(args),
        Commands::Snapshot(args) => commands::metrics::run_snapshot(args),
        Commands::Version => {
            println!("saasm {}", env!("CARGO_PKG_VERSION"));
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
