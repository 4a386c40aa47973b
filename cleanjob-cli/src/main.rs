//! cleanjob CLI: validate and inspect data-cleaning job files.

mod commands;
mod load;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// cleanjob: validate data-cleaning job descriptions
#[derive(Parser, Debug)]
#[command(name = "cleanjob", version, about, long_about = None)]
struct Cli {
    /// Prefix for environment overrides (e.g. CLEANJOB_SOURCE__API_TOKEN)
    #[arg(long, global = true, default_value = load::DEFAULT_ENV_PREFIX)]
    env_prefix: String,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Validate a job file and report every problem found
    Validate {
        /// Job file (.toml, .json, .yaml or .yml)
        file: PathBuf,
    },
    /// Print the normalized job description with secrets masked
    Show {
        /// Job file (.toml, .json, .yaml or .yml)
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = commands::ShowFormat::Json)]
        output: commands::ShowFormat,
    },
}

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // RUST_LOG wins over the -v flags when set.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Validate { file } => commands::validate(&file, &cli.env_prefix, cli.quiet),
        Commands::Show { file, output } => commands::show(&file, &cli.env_prefix, output),
    }
}
