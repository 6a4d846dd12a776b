//! Summary command - totals for the logged-in user

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use wisewallet_core::services::Totals;

use super::get_session;
use crate::output;

#[derive(Serialize)]
struct Summary {
    #[serde(flatten)]
    totals: Totals,
    transactions: usize,
    budgets: usize,
    savings_goals: usize,
}

pub fn run(json: bool) -> Result<()> {
    let (ctx, user) = get_session("summary")?;
    let transactions = ctx.transaction_service.list_transactions(&user);

    let summary = Summary {
        totals: ctx.analytics_service.totals(&transactions),
        transactions: transactions.len(),
        budgets: ctx.budget_service.list_budgets(&user).len(),
        savings_goals: ctx.savings_service.list_savings_goals(&user).len(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", format!("{}'s wallet", user.username).bold());
    println!();

    let mut table = output::create_table();
    table.add_row(vec!["Income".to_string(), output::money(summary.totals.income, &user.currency).green().to_string()]);
    table.add_row(vec!["Expenses".to_string(), output::money(summary.totals.expense, &user.currency)]);
    table.add_row(vec!["Balance".to_string(), output::money(summary.totals.balance, &user.currency).bold().to_string()]);
    table.add_row(vec!["Transactions".to_string(), summary.transactions.to_string()]);
    table.add_row(vec!["Budgets".to_string(), summary.budgets.to_string()]);
    table.add_row(vec!["Savings goals".to_string(), summary.savings_goals.to_string()]);
    println!("{}", table);

    Ok(())
}
