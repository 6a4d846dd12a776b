//! Budget commands - one monthly limit per expense category

use anyhow::{anyhow, Result};
use clap::Subcommand;
use colored::Colorize;
use wisewallet_core::Category;

use super::{get_session, parse_amount, parse_date_or_today};
use crate::output;

#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Set (or replace) the limit for a category
    Set {
        /// Expense category
        category: String,
        /// Monthly limit
        limit: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List budgets
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove the budget for a category
    Delete {
        /// Expense category
        category: String,
    },
    /// Show spending against budgets for a month
    Status {
        /// Any date in the month (YYYY-MM-DD), defaults to today
        #[arg(long)]
        month: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_expense_category(raw: &str) -> Result<Category> {
    let category: Category = raw.parse().map_err(|e: String| anyhow!(e))?;
    if !category.is_expense() {
        anyhow::bail!("Budgets apply to expense categories only, not {}", category);
    }
    Ok(category)
}

pub fn run(command: BudgetCommands) -> Result<()> {
    match command {
        BudgetCommands::Set { category, limit, json } => {
            let (ctx, user) = get_session("budget set")?;
            let budget = ctx.budget_service.save_budget(
                &user,
                parse_expense_category(&category)?,
                parse_amount(&limit)?,
            )?;
            if json {
                println!("{}", serde_json::to_string_pretty(&budget)?);
            } else {
                output::success(&format!(
                    "Budget for {} set to {}",
                    budget.category,
                    output::money(budget.limit, &user.currency)
                ));
            }
        }
        BudgetCommands::List { json } => {
            let (ctx, user) = get_session("budget list")?;
            let budgets = ctx.budget_service.list_budgets(&user);
            if json {
                println!("{}", serde_json::to_string_pretty(&budgets)?);
                return Ok(());
            }
            if budgets.is_empty() {
                println!("No budgets set.");
                return Ok(());
            }
            let mut table = output::create_table();
            table.set_header(vec!["Category", "Limit"]);
            for b in &budgets {
                table.add_row(vec![b.category.to_string(), output::money(b.limit, &user.currency)]);
            }
            println!("{}", table);
        }
        BudgetCommands::Delete { category } => {
            let (ctx, user) = get_session("budget delete")?;
            let category = parse_expense_category(&category)?;
            ctx.budget_service.delete_budget(&user, category)?;
            output::success(&format!("Budget for {} removed", category));
        }
        BudgetCommands::Status { month, json } => {
            let (ctx, user) = get_session("budget status")?;
            let month = parse_date_or_today(month.as_deref())?;
            let usage = ctx.analytics_service.budget_usage(
                &ctx.transaction_service.list_transactions(&user),
                &ctx.budget_service.list_budgets(&user),
                month,
            );
            if json {
                println!("{}", serde_json::to_string_pretty(&usage)?);
                return Ok(());
            }

            println!("{}", format!("Budgets for {}", month.format("%B %Y")).bold());
            let mut table = output::create_table();
            table.set_header(vec!["Category", "Spent", "Limit", "Progress", ""]);
            for u in &usage {
                let limit = if u.limit.is_zero() {
                    "-".dimmed().to_string()
                } else {
                    output::money(u.limit, &user.currency)
                };
                let flag = if u.over_budget {
                    "over".red().bold().to_string()
                } else {
                    String::new()
                };
                table.add_row(vec![
                    u.category.to_string(),
                    output::money(u.spent, &user.currency),
                    limit,
                    format!("{} {}", output::progress_bar(u.percentage, 10), output::percent(u.percentage)),
                    flag,
                ]);
            }
            println!("{}", table);
        }
    }

    Ok(())
}
