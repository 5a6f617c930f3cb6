use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand};
use moneymood_analysis::{LlmAnalyzer, Provider};
use moneymood_core::{Category, Dashboard, TransactionEntry, View};
use moneymood_ingest::{export_transactions_file, read_transactions_file};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

mod config;
mod render;

use config::Config;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("MONEYMOOD_BUILD_SHA"),
    ")"
);

#[derive(Parser, Debug)]
#[command(
    name = "moneymood",
    version,
    long_version = LONG_VERSION,
    about = "Spending dashboard with behavioral analysis"
)]
struct Cli {
    /// Log level for moneymood crates. RUST_LOG takes precedence when set.
    #[arg(long, global = true, default_value_t = LevelFilter::WARN)]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Command,
}

/// Where the session's transactions come from.
#[derive(Args, Debug, Clone, Default)]
struct SourceArgs {
    /// CSV file to import (date,amount,category,description). Repeat to append several.
    #[arg(long = "csv", value_name = "FILE")]
    csv: Vec<PathBuf>,

    /// Start from an empty ledger instead of the demo transactions
    #[arg(long)]
    no_seed: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// KPI cards, allocation map, daily momentum and behavior windows
    Summary {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Every transaction, newest entries first
    Ledger {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Record a manual transaction
    Add {
        #[command(flatten)]
        source: SourceArgs,

        #[arg(long)]
        amount: String,

        #[arg(long)]
        description: String,

        /// Defaults to Food & Dining
        #[arg(long)]
        category: Option<Category>,

        /// YYYY-MM-DD, defaults to today in the configured timezone
        #[arg(long)]
        date: Option<NaiveDate>,

        /// HH:MM, defaults to 12:00
        #[arg(long, value_parser = parse_time)]
        time: Option<NaiveTime>,

        /// Write the resulting ledger to this CSV
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },

    /// Ask the configured model for a behavioral profile
    Analyze {
        #[command(flatten)]
        source: SourceArgs,

        /// Override analysis.provider from the config
        #[arg(long)]
        provider: Option<Provider>,

        /// Override analysis.model from the config
        #[arg(long)]
        model: Option<String>,

        /// Print the raw result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the current ledger as CSV
    Export {
        #[command(flatten)]
        source: SourceArgs,

        #[arg(long, value_name = "FILE")]
        out: PathBuf,
    },

    /// Manage ~/.moneymood/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
    /// Print the config file location
    Path,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.log_level);
    debug!("Log level set to {}", cli.log_level.to_string().to_lowercase());

    match main_inner(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!("exiting with error: {e:?}");
            eprintln!("{}", failure_line(&e));
            ExitCode::FAILURE
        }
    }
}

async fn main_inner(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Summary { source } => {
            let cfg = config::load_config()?;
            let dash = load_dashboard(&source, &cfg)?;
            print!("{}", render::summary(&dash));
        }

        Command::Ledger { source } => {
            let cfg = config::load_config()?;
            let mut dash = load_dashboard(&source, &cfg)?;
            dash.set_view(View::Transactions);
            print!("{}", render::ledger(dash.transactions()));
        }

        Command::Add {
            source,
            amount,
            description,
            category,
            date,
            time,
            out,
        } => {
            let cfg = config::load_config()?;
            let mut dash = load_dashboard(&source, &cfg)?;

            let date = match date {
                Some(d) => d,
                None => cfg.data.today()?,
            };
            let mut entry = TransactionEntry::new(amount, description, date);
            if let Some(c) = category {
                entry.category = c;
            }
            if let Some(t) = time {
                entry.time = t;
            }
            dash.add_transaction(entry.into_transaction()?);
            print!("{}", render::ledger(dash.transactions()));

            if let Some(path) = out {
                export(&dash, &path)?;
            }
        }

        Command::Analyze {
            source,
            provider,
            model,
            json,
        } => {
            let mut cfg = config::load_config()?;
            if let Some(p) = provider {
                cfg.analysis.provider = p.to_string();
                // the configured model, url and key belong to the old provider
                cfg.analysis.model.clear();
                cfg.analysis.base_url.clear();
                cfg.analysis.api_key_env.clear();
            }
            if let Some(m) = model {
                cfg.analysis.model = m;
            }

            let mut dash = load_dashboard(&source, &cfg)?;
            let llm = cfg.analysis.to_llm_config()?;
            info!(provider = %llm.provider, model = %llm.model, "running analysis");
            let analyzer = LlmAnalyzer::new(llm)?;

            let result = dash.run_analysis(&analyzer).await?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(result).context("serialize analysis")?
                );
            } else {
                print!("{}", render::kpi_cards(&dash.summary(), dash.analysis()));
                println!();
                if let Some(result) = dash.analysis() {
                    print!("{}", render::analysis(result));
                }
            }
        }

        Command::Export { source, out } => {
            let cfg = config::load_config()?;
            let dash = load_dashboard(&source, &cfg)?;
            export(&dash, &out)?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => {
                let (path, written) = config::init_config()?;
                if written {
                    println!("Wrote {}", path.display());
                } else {
                    println!("Config already exists at {}", path.display());
                }
            }
            ConfigCommand::Show => {
                let cfg = config::load_config()?;
                print!("{}", show_config(&cfg)?);
            }
            ConfigCommand::Path => {
                println!("{}", config::config_path()?.display());
            }
        },
    }

    Ok(())
}

/// Seed (unless disabled) then append each CSV in order.
fn load_dashboard(source: &SourceArgs, cfg: &Config) -> Result<Dashboard> {
    let mut dash = if source.no_seed || !cfg.data.seed_mock {
        Dashboard::default()
    } else {
        Dashboard::with_mock_data()
    };

    for path in &source.csv {
        let parsed = read_transactions_file(path)?;
        let added = dash
            .import(parsed)
            .with_context(|| format!("importing {}", path.display()))?;
        info!(added, path = %path.display(), "imported csv");
    }
    Ok(dash)
}

fn export(dash: &Dashboard, path: &Path) -> Result<()> {
    export_transactions_file(path, dash.transactions())?;
    println!("Exported {} transactions to {}", dash.transactions().len(), path.display());
    Ok(())
}

/// The effective config as TOML, plus whether the key variable is set. Never prints the key.
fn show_config(cfg: &Config) -> Result<String> {
    let mut out = toml::to_string_pretty(cfg).context("serialize config")?;
    let llm = cfg.analysis.to_llm_config()?;
    let status = if !llm.provider.needs_api_key() {
        "not required".to_string()
    } else if llm.api_key.is_some() {
        format!("set ({} or API_KEY)", llm.api_key_env)
    } else {
        format!("unset ({} or API_KEY)", llm.api_key_env)
    };
    out.push_str(&format!("\n# api key: {status}\n"));
    Ok(out)
}

fn failure_line(e: &anyhow::Error) -> String {
    format!("error: {e:#}")
}

fn parse_time(s: &str) -> std::result::Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M").map_err(|e| format!("expected HH:MM: {e}"))
}

/// Initializes the tracing subscriber.
fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => EnvFilter::from_default_env(),
        None => EnvFilter::new(
            ["moneymood", "moneymood_core", "moneymood_ingest", "moneymood_analysis"]
                .map(|target| format!("{target}={level}"))
                .join(","),
        ),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
