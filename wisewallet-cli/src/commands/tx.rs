//! Transaction commands - add, list and delete income and expenses

use anyhow::{anyhow, Result};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;
use wisewallet_core::{Category, NewTransaction, TransactionType};

use super::{get_session, parse_amount, parse_date_or_today, parse_id_prefix};
use crate::output;

#[derive(Subcommand)]
pub enum TxCommands {
    /// Record an income or expense
    Add {
        /// Amount (positive)
        amount: String,
        /// Transaction type (income, expense)
        #[arg(long = "type", default_value = "expense")]
        kind: String,
        /// Category, e.g. Groceries or "Other Income"
        #[arg(long)]
        category: String,
        /// Free-text description
        #[arg(long, default_value = "")]
        description: String,
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List transactions, newest first
    List {
        /// Maximum number of rows
        #[arg(short, long)]
        limit: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a transaction by id
    Delete {
        /// Transaction ID
        id: String,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },
}

pub fn run(command: TxCommands) -> Result<()> {
    match command {
        TxCommands::Add { amount, kind, category, description, date, json } => {
            run_add(&amount, &kind, &category, description, date.as_deref(), json)
        }
        TxCommands::List { limit, json } => run_list(limit, json),
        TxCommands::Delete { id, force } => run_delete(&id, force),
    }
}

fn run_add(
    amount: &str,
    kind: &str,
    category: &str,
    description: String,
    date: Option<&str>,
    json: bool,
) -> Result<()> {
    let (ctx, user) = get_session("tx add")?;

    let kind: TransactionType = kind.parse().map_err(|e: String| anyhow!(e))?;
    let category: Category = category.parse().map_err(|e: String| anyhow!(e))?;
    let new_tx = NewTransaction::new(
        parse_amount(amount)?,
        kind,
        category,
        description,
        parse_date_or_today(date)?,
    );

    let tx = ctx.transaction_service.add_transaction(&user, new_tx)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tx)?);
    } else {
        output::success(&format!(
            "Added {} of {} ({})",
            tx.kind.as_str().to_lowercase(),
            output::money(tx.amount, &user.currency),
            tx.category
        ));
        println!("  ID: {}", tx.id.dimmed());
    }
    Ok(())
}

fn run_list(limit: Option<usize>, json: bool) -> Result<()> {
    let (ctx, user) = get_session("tx list")?;
    let mut transactions = ctx.transaction_service.list_transactions(&user);
    if let Some(limit) = limit {
        transactions.truncate(limit);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&transactions)?);
        return Ok(());
    }

    if transactions.is_empty() {
        println!("No transactions yet.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Date", "Type", "Category", "Description", "Amount", "ID"]);
    for tx in &transactions {
        let amount = output::money(tx.amount, &user.currency);
        let amount = match tx.kind {
            TransactionType::Income => format!("+{}", amount).green().to_string(),
            TransactionType::Expense => format!("-{}", amount),
        };
        table.add_row(vec![
            tx.date.format("%Y-%m-%d").to_string(),
            tx.kind.to_string(),
            tx.category.to_string(),
            tx.description.clone(),
            amount,
            tx.id.chars().take(8).collect(),
        ]);
    }
    println!("{}", table);
    Ok(())
}

fn run_delete(id: &str, force: bool) -> Result<()> {
    let id = parse_id_prefix(id)?;
    let (ctx, user) = get_session("tx delete")?;

    // Accept the short id shown by `ww tx list`
    let matches: Vec<String> = ctx
        .transaction_service
        .list_transactions(&user)
        .into_iter()
        .filter(|t| t.id.starts_with(id))
        .map(|t| t.id)
        .collect();
    let full_id = match matches.as_slice() {
        [] => {
            output::warning(&format!("No transaction matches {}", id));
            return Ok(());
        }
        [only] => only.clone(),
        _ => anyhow::bail!("Ambiguous id {}: {} transactions match", id, matches.len()),
    };

    if !force
        && !Confirm::new()
            .with_prompt(format!("Delete transaction {}?", full_id))
            .default(false)
            .interact()?
    {
        println!("Cancelled.");
        return Ok(());
    }

    ctx.transaction_service.delete_transaction(&user, &full_id)?;
    output::success("Transaction deleted");
    Ok(())
}
