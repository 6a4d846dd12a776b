//! Savings goal commands

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use rust_decimal::Decimal;
use wisewallet_core::{SavingsGoal, User, WalletContext};

use super::{get_session, parse_amount, parse_id_prefix};
use crate::output;

#[derive(Subcommand)]
pub enum GoalCommands {
    /// Create a savings goal
    Add {
        /// Goal name
        name: String,
        /// Target amount
        target: String,
        /// Amount already saved
        #[arg(long, default_value = "0")]
        current: String,
        /// Display color (hex)
        #[arg(long)]
        color: Option<String>,
        /// Deadline (free text, e.g. 2025-12-31)
        #[arg(long)]
        deadline: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List savings goals with progress
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add to (or withdraw from) a goal's balance
    Adjust {
        /// Goal ID (or unique prefix)
        id: String,
        /// Amount to add; negative to withdraw
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a goal
    Delete {
        /// Goal ID (or unique prefix)
        id: String,
    },
}

/// Resolve a full goal id from a prefix
fn resolve_goal(ctx: &WalletContext, user: &User, id: &str) -> Result<SavingsGoal> {
    let id = parse_id_prefix(id)?;
    let mut matches: Vec<SavingsGoal> = ctx
        .savings_service
        .list_savings_goals(user)
        .into_iter()
        .filter(|g| g.id.starts_with(id))
        .collect();
    match matches.len() {
        0 => anyhow::bail!("No savings goal matches {}", id),
        1 => Ok(matches.remove(0)),
        n => anyhow::bail!("Ambiguous id {}: {} goals match", id, n),
    }
}

pub fn run(command: GoalCommands) -> Result<()> {
    match command {
        GoalCommands::Add { name, target, current, color, deadline, json } => {
            let (ctx, user) = get_session("goal add")?;
            let goal = ctx.savings_service.new_savings_goal(
                &name,
                parse_amount(&target)?,
                parse_amount(&current)?,
                color.as_deref(),
                deadline.as_deref(),
            );
            let goal = ctx.savings_service.save_savings_goal(&user, goal)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&goal)?);
            } else {
                output::success(&format!("Created goal {}", goal.name));
                println!("  ID: {}", goal.id.dimmed());
            }
        }
        GoalCommands::List { json } => {
            let (ctx, user) = get_session("goal list")?;
            let goals = ctx.savings_service.list_savings_goals(&user);
            let progress = ctx.analytics_service.savings_progress(&goals);
            if json {
                println!("{}", serde_json::to_string_pretty(&progress)?);
                return Ok(());
            }
            if progress.is_empty() {
                println!("No savings goals yet.");
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["Goal", "Saved", "Target", "Progress", "ID"]);
            for (p, g) in progress.iter().zip(&goals) {
                let name = match &g.deadline {
                    Some(d) => format!("{} (by {})", p.name, d),
                    None => p.name.clone(),
                };
                let bar = format!("{} {}", output::progress_bar(p.percentage, 10), output::percent(p.percentage));
                table.add_row(vec![
                    name,
                    output::money(p.current_amount, &user.currency),
                    output::money(p.target_amount, &user.currency),
                    if p.completed { bar.green().to_string() } else { bar },
                    p.id.chars().take(8).collect(),
                ]);
            }
            println!("{}", table);
        }
        GoalCommands::Adjust { id, amount, json } => {
            let (ctx, user) = get_session("goal adjust")?;
            let goal = resolve_goal(&ctx, &user, &id)?;
            let delta: Decimal = parse_amount(&amount)?;
            let goal = ctx.savings_service.adjust_savings_goal(&user, &goal.id, delta)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&goal)?);
            } else {
                output::success(&format!(
                    "{}: {} of {} ({})",
                    goal.name,
                    output::money(goal.current_amount, &user.currency),
                    output::money(goal.target_amount, &user.currency),
                    output::percent(goal.percentage())
                ));
                if goal.is_completed() {
                    output::info("Goal reached!");
                }
            }
        }
        GoalCommands::Delete { id } => {
            let (ctx, user) = get_session("goal delete")?;
            let goal = resolve_goal(&ctx, &user, &id)?;
            ctx.savings_service.delete_savings_goal(&user, &goal.id)?;
            output::success(&format!("Deleted goal {}", goal.name));
        }
    }

    Ok(())
}
