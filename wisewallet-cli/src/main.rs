//! Wise Wallet CLI - personal finance in your terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{advice, analytics, auth, budget, export, goal, logs, summary, tx, watch};

/// Wise Wallet - personal finance in your terminal
#[derive(Parser)]
#[command(name = "ww", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and log in
    Signup {
        /// Display name
        #[arg(long)]
        username: Option<String>,
        /// Account email
        #[arg(long)]
        email: Option<String>,
        /// Password (falls back to WISE_WALLET_PASSWORD, then a prompt)
        #[arg(long)]
        password: Option<String>,
        /// Display currency (ISO 4217 code)
        #[arg(long)]
        currency: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Log in to an existing account
    Login {
        /// Account email
        #[arg(long)]
        email: Option<String>,
        /// Password (falls back to WISE_WALLET_PASSWORD, then a prompt)
        #[arg(long)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// End the current session
    Logout,

    /// Show the logged-in user
    Whoami {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage transactions
    Tx {
        #[command(subcommand)]
        command: tx::TxCommands,
    },

    /// Manage monthly category budgets
    Budget {
        #[command(subcommand)]
        command: budget::BudgetCommands,
    },

    /// Manage savings goals
    Goal {
        #[command(subcommand)]
        command: goal::GoalCommands,
    },

    /// Show income, expense and balance
    Summary {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show expense breakdown and monthly trend
    Analytics {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export transactions to CSV or JSON
    Export {
        /// Output format (csv, json)
        #[arg(long, default_value = "csv")]
        format: String,
        /// Output file (defaults to wise-wallet-export-<date>.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write to stdout instead of a file
        #[arg(long)]
        stdout: bool,
    },

    /// Ask the assistant for spending advice
    Advice {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Follow changes made by other sessions
    Watch {
        /// Poll interval in milliseconds (defaults to settings)
        #[arg(long)]
        interval_ms: Option<u64>,
    },

    /// View and manage application logs
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Signup { username, email, password, currency, json } => {
            auth::run_signup(username, email, password, currency, json)
        }
        Commands::Login { email, password, json } => auth::run_login(email, password, json),
        Commands::Logout => auth::run_logout(),
        Commands::Whoami { json } => auth::run_whoami(json),
        Commands::Tx { command } => tx::run(command),
        Commands::Budget { command } => budget::run(command),
        Commands::Goal { command } => goal::run(command),
        Commands::Summary { json } => summary::run(json),
        Commands::Analytics { json } => analytics::run(json),
        Commands::Export { format, output, stdout } => export::run(&format, output, stdout),
        Commands::Advice { json } => advice::run(json),
        Commands::Watch { interval_ms } => watch::run(interval_ms),
        Commands::Logs { command } => logs::run(command),
    }
}
