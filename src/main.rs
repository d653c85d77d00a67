use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

use meteora_lp_metrics::analytics::{process_wallets, Blacklist, ProcessorSettings};
use meteora_lp_metrics::chain::{EndpointClients, SourceProvider, CLI_USER};
use meteora_lp_metrics::config::{Config, LoggingConfig};
use meteora_lp_metrics::logging;
use meteora_lp_metrics::reporting::{
    format_report, generate_filename, write_csv_report, OutputFormat,
};

const USAGE: &str = "Usage: meteora-metrics <wallet_address1> [<wallet_address2> ...]";

/// Meteora LP metrics for Solana wallets
#[derive(Parser, Debug)]
#[command(name = "meteora-metrics", version, about, args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Wallet addresses to analyze
    wallets: Vec<String>,

    /// Output format; asked interactively when omitted
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the Telegram bot
    Bot,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.command.is_none() && cli.wallets.is_empty() {
        eprintln!("{}", USAGE);
        return Ok(ExitCode::FAILURE);
    }

    let bot_mode = cli.command.is_some();
    let log_config = LoggingConfig::load();
    let _log_guard = logging::init(&log_config.log_file, &log_config.level, bot_mode);

    let config = Arc::new(Config::load().context("Failed to load configuration")?);
    info!("Configuration loaded");

    let provider: Arc<dyn SourceProvider> = Arc::new(
        EndpointClients::new(config.clone()).context("Failed to set up endpoint clients")?,
    );
    let blacklist = Arc::new(Blacklist::load(&config.report.blacklist_file));

    match cli.command {
        #[cfg(feature = "telegram")]
        Some(Commands::Bot) => {
            use meteora_lp_metrics::telegram::{self, BotContext};

            let ctx = Arc::new(BotContext::new(config, provider, blacklist));
            telegram::run(ctx).await?;
            Ok(ExitCode::SUCCESS)
        }
        #[cfg(not(feature = "telegram"))]
        Some(Commands::Bot) => {
            anyhow::bail!("this build does not include the telegram feature")
        }
        None => {
            let format = match cli.format {
                Some(format) => format,
                None => match prompt_format()? {
                    Some(format) => format,
                    None => {
                        println!("Invalid choice. Exiting.");
                        return Ok(ExitCode::FAILURE);
                    }
                },
            };
            run_cli(&config, provider, blacklist, &cli.wallets, format).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn prompt_format() -> Result<Option<OutputFormat>> {
    println!("Choose output format:");
    println!("1. CSV file");
    println!("2. Text report");
    println!("3. Both formats");
    print!("Enter your choice (1-3): ");
    io::stdout().flush()?;

    let mut choice = String::new();
    io::stdin()
        .lock()
        .read_line(&mut choice)
        .context("Failed to read choice")?;
    Ok(OutputFormat::from_choice(&choice))
}

async fn run_cli(
    config: &Config,
    provider: Arc<dyn SourceProvider>,
    blacklist: Arc<Blacklist>,
    wallets: &[String],
    format: OutputFormat,
) -> Result<()> {
    info!("Analyzing {} wallet(s)", wallets.len());
    let settings = ProcessorSettings::from_config(config);
    let results = process_wallets(
        wallets,
        CLI_USER,
        provider.clone(),
        blacklist,
        &settings,
        config.processing.wallet_concurrency,
    )
    .await;
    provider.release(CLI_USER);

    if format.includes_text() {
        println!("{}", format_report(&results));
    }

    if format.includes_csv() {
        let path = generate_filename(&config.report.output_dir, Local::now().date_naive());
        match write_csv_report(&results, &path) {
            Ok(()) => println!("\nCSV report generated: {}", path.display()),
            Err(e) => error!("Failed to write CSV: {}", e),
        }
    }

    Ok(())
}
