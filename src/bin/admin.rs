//! CLI administration tool for range-shortener.
//!
//! Drives the allocator and the shortener directly against the configured
//! stores, without a running service.
//!
//! # Usage
//!
//! ```bash
//! # Claim the next partition from the global counter
//! cargo run --bin admin -- partition allocate
//!
//! # Issue one key for a worker
//! cargo run --bin admin -- key next --worker batch-01
//!
//! # Inspect a worker's range history
//! cargo run --bin admin -- worker show batch-01
//! cargo run --bin admin -- worker show batch-01 --json
//!
//! # Encode and decode short codes
//! cargo run --bin admin -- code encode 3364 https://example.com
//! cargo run --bin admin -- code decode 211f0
//!
//! # Shorten and resolve URLs
//! cargo run --bin admin -- shorten https://example.com/some/long/path
//! cargo run --bin admin -- resolve 211f0
//!
//! # Check store connectivity
//! cargo run --bin admin -- health
//! ```
//!
//! # Environment Variables
//!
//! See [`range_shortener::config`]. `DATABASE_URL` is required for every
//! command except `code`.

use range_shortener::AppState;
use range_shortener::config::{self, Config};
use range_shortener::domain::entities::{WorkerState, global_key};
use range_shortener::telemetry;
use range_shortener::utils::key_encoder;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;

/// CLI tool for managing range-shortener.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Global partition counter
    Partition {
        #[command(subcommand)]
        action: PartitionAction,
    },

    /// Key issuance
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// Worker range state
    Worker {
        #[command(subcommand)]
        action: WorkerAction,
    },

    /// Short code encoding (no store access)
    Code {
        #[command(subcommand)]
        action: CodeAction,
    },

    /// Shorten a long URL
    Shorten {
        /// Absolute http(s) URL
        url: String,
    },

    /// Resolve a short code to its long URL
    Resolve {
        /// Short code
        code: String,
    },

    /// Check database and cache connectivity
    Health,
}

#[derive(Subcommand)]
enum PartitionAction {
    /// Allocate the next partition number
    Allocate,

    /// Show the last allocated partition number
    Current,
}

#[derive(Subcommand)]
enum KeyAction {
    /// Issue the next key
    Next {
        /// Worker identity (defaults to WORKER_ID or the host name)
        #[arg(short, long)]
        worker: Option<String>,
    },
}

#[derive(Subcommand)]
enum WorkerAction {
    /// Show a worker's allocated ranges
    Show {
        /// Worker identity
        worker_id: String,

        /// Print the raw state as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum CodeAction {
    /// Encode a key with a payload
    Encode {
        /// Global key
        key: u64,

        /// Payload whose digest supplies the suffix
        payload: String,
    },

    /// Recover the key from a code
    Decode {
        /// Short code
        code: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Code { action } => handle_code_action(action),
        command => run_with_state(command).await,
    }
}

/// Dispatches commands that need the configured stores.
async fn run_with_state(command: Commands) -> Result<()> {
    let config = config::load_from_env().context("Invalid configuration")?;
    telemetry::init_tracing(&config.log_level, &config.log_format)?;

    let state = AppState::from_config(&config).await?;

    match command {
        Commands::Partition { action } => handle_partition_action(action, &state).await?,
        Commands::Key { action } => handle_key_action(action, &state, &config).await?,
        Commands::Worker { action } => handle_worker_action(action, &state).await?,
        Commands::Shorten { url } => shorten(&state, &url).await?,
        Commands::Resolve { code } => resolve(&state, &code).await?,
        Commands::Health => health(&state).await?,
        Commands::Code { action } => handle_code_action(action)?,
    }

    Ok(())
}

async fn handle_partition_action(action: PartitionAction, state: &AppState) -> Result<()> {
    match action {
        PartitionAction::Allocate => {
            let partition = state.partitions.allocate_range_partition().await?;
            println!(
                "{} {}",
                "Allocated partition".green().bold(),
                partition.to_string().bright_yellow()
            );
        }
        PartitionAction::Current => {
            let partition = state.partitions.last_allocated_partition().await?;
            println!("{}", "Partition counter".bright_blue().bold());
            println!("  Last allocated: {}", partition.to_string().cyan());
            println!(
                "  Max partition:  {}",
                state.partitions.max_partition().to_string().cyan()
            );
        }
    }

    Ok(())
}

async fn handle_key_action(action: KeyAction, state: &AppState, config: &Config) -> Result<()> {
    match action {
        KeyAction::Next { worker } => {
            let worker_id = worker.unwrap_or_else(|| state.worker_id.clone());
            let key = state.keys.get_new_key(&worker_id).await?;

            println!(
                "{} {} {}",
                "Issued key".green().bold(),
                key.to_string().bright_yellow(),
                format!("(worker {}, range size {})", worker_id, config.range_size).dimmed()
            );
        }
    }

    Ok(())
}

async fn handle_worker_action(action: WorkerAction, state: &AppState) -> Result<()> {
    match action {
        WorkerAction::Show { worker_id, json } => {
            match state.keys.worker_state(&worker_id).await? {
                Some(worker) if json => println!("{}", serde_json::to_string_pretty(&worker)?),
                Some(worker) => print_worker(&worker, state.keys.range_size()),
                None => println!("{} {}", "No state for worker".yellow(), worker_id),
            }
        }
    }

    Ok(())
}

/// Prints one line per allocated range, oldest first.
fn print_worker(worker: &WorkerState, range_size: i64) {
    println!("{}", "Worker state".bright_blue().bold());
    println!("  Worker:  {}", worker.worker_id.cyan());
    println!("  Version: {}", worker.version);
    println!();

    if worker.allocated_ranges.is_empty() {
        println!("  {}", "No ranges allocated".yellow());
        return;
    }

    println!(
        "  {:<12} {:<12} {:<22} {}",
        "PARTITION".bold(),
        "COUNTER".bold(),
        "LAST KEY".bold(),
        "STATUS".bold()
    );

    for range in &worker.allocated_ranges {
        let last_key = if range.counter > 0 {
            global_key(range.partition_number, range.counter, range_size)
                .map(|k| k.to_string())
                .unwrap_or_else(|_| "overflow".to_string())
        } else {
            "-".to_string()
        };
        let status = if range.exhausted {
            "exhausted".red()
        } else {
            "active".green()
        };

        println!(
            "  {:<12} {:<12} {:<22} {}",
            range.partition_number, range.counter, last_key, status
        );
    }
}

fn handle_code_action(action: CodeAction) -> Result<()> {
    match action {
        CodeAction::Encode { key, payload } => {
            let code = key_encoder::encode(key, &payload);
            println!("{}", code.bright_yellow().bold());
        }
        CodeAction::Decode { code } => {
            let key = key_encoder::decode_key(&code)?;
            println!("{} {}", "Key".green().bold(), key.to_string().bright_yellow());
        }
    }

    Ok(())
}

async fn shorten(state: &AppState, url: &str) -> Result<()> {
    let short_url = state.short_urls.shorten(url).await?;

    println!("{}", "Short URL".green().bold());
    println!("  Code:     {}", short_url.code.bright_yellow().bold());
    println!("  Long URL: {}", short_url.long_url.cyan());
    if let Some(expires_at) = short_url.expires_at {
        println!("  Expires:  {}", expires_at.format("%Y-%m-%d %H:%M:%S UTC"));
    }

    Ok(())
}

async fn resolve(state: &AppState, code: &str) -> Result<()> {
    let long_url = state.short_urls.resolve(code).await?;
    println!("{}", long_url.cyan());

    Ok(())
}

async fn health(state: &AppState) -> Result<()> {
    let (database_ok, cache_ok) = state.health().await;

    let mark = |ok: bool| if ok { "ok".green() } else { "unreachable".red() };

    println!("{}", "Health".bright_blue().bold());
    println!("  Database: {}", mark(database_ok));
    println!("  Cache:    {}", mark(cache_ok));
    println!("  Worker:   {}", state.worker_id.cyan());

    if !database_ok {
        anyhow::bail!("database is unreachable");
    }

    Ok(())
}
