use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use cryptoconv::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for cryptoconv::AppCommand {
    fn from(cmd: Commands) -> cryptoconv::AppCommand {
        match cmd {
            Commands::Currencies => cryptoconv::AppCommand::Currencies,
            Commands::Markets { fiat } => cryptoconv::AppCommand::Markets { fiat },
            Commands::Convert { amount, fiat, coin } => {
                cryptoconv::AppCommand::Convert { amount, fiat, coin }
            }
            Commands::Interactive { fiat } => cryptoconv::AppCommand::Interactive { fiat },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// List supported fiat currencies
    Currencies,
    /// Show the top cryptocurrencies by market cap, stablecoins excluded
    Markets {
        /// Fiat currency to price in (defaults to the configured one)
        #[arg(short, long)]
        fiat: Option<String>,
    },
    /// Convert a fiat amount into a cryptocurrency
    Convert {
        /// Amount in fiat (defaults to the configured amount)
        amount: Option<String>,
        /// Fiat currency code
        #[arg(short, long)]
        fiat: Option<String>,
        /// Cryptocurrency id or symbol (defaults to the largest by market cap)
        #[arg(long)]
        coin: Option<String>,
    },
    /// Start an interactive converter session
    Interactive {
        /// Fiat currency code
        #[arg(short, long)]
        fiat: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => cryptoconv::cli::setup::setup(),
        Some(cmd) => cryptoconv::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
