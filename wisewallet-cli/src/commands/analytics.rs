//! Analytics command - expense breakdown and monthly trend

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use wisewallet_core::services::{CategoryShare, MonthlyPoint};

use super::get_session;
use crate::output;

#[derive(Serialize)]
struct Report {
    breakdown: Vec<CategoryShare>,
    monthly: Vec<MonthlyPoint>,
}

pub fn run(json: bool) -> Result<()> {
    let (ctx, user) = get_session("analytics")?;
    let transactions = ctx.transaction_service.list_transactions(&user);

    let report = Report {
        breakdown: ctx.analytics_service.expense_breakdown(&transactions),
        monthly: ctx.analytics_service.monthly_series(&transactions),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if transactions.is_empty() {
        println!("No transactions yet.");
        return Ok(());
    }

    println!("{}", "Expense Breakdown".bold());
    if report.breakdown.is_empty() {
        println!("  {}", "No expenses recorded.".dimmed());
    } else {
        let mut table = output::create_table();
        table.set_header(vec!["Category", "Amount", "Share"]);
        for share in &report.breakdown {
            table.add_row(vec![
                share.category.to_string(),
                output::money(share.amount, &user.currency),
                format!("{} {}", output::progress_bar(share.percentage, 10), output::percent(share.percentage)),
            ]);
        }
        println!("{}", table);
    }
    println!();

    println!("{}", "Monthly Trend".bold());
    let mut table = output::create_table();
    table.set_header(vec!["Month", "Income", "Expense", "Balance"]);
    for point in &report.monthly {
        table.add_row(vec![
            point.label.clone(),
            output::money(point.income, &user.currency),
            output::money(point.expense, &user.currency),
            output::money(point.cumulative, &user.currency),
        ]);
    }
    println!("{}", table);

    Ok(())
}
