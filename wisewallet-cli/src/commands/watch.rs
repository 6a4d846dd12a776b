//! Watch command - follow writes made by other sessions
//!
//! Every `ww` invocation is its own session over the shared wallet file, so
//! this polls the store and prints each change another session makes.

use std::thread;
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use colored::Colorize;
use wisewallet_core::{Budget, SavingsGoal, Subscription, Transaction, User};

use super::get_session;
use crate::output;

fn stamp() -> String {
    Local::now().format("%H:%M:%S").to_string().dimmed().to_string()
}

fn watch_user(ctx: &wisewallet_core::WalletContext, user: &User) -> Vec<Subscription> {
    vec![
        ctx.transaction_service.subscribe(user, |txs: Vec<Transaction>| {
            println!("{} transactions: {}", stamp(), txs.len());
        }),
        ctx.budget_service.subscribe(user, |budgets: Vec<Budget>| {
            println!("{} budgets: {}", stamp(), budgets.len());
        }),
        ctx.savings_service.subscribe(user, |goals: Vec<SavingsGoal>| {
            println!("{} savings goals: {}", stamp(), goals.len());
        }),
    ]
}

pub fn run(interval_ms: Option<u64>) -> Result<()> {
    let (ctx, user) = get_session("watch")?;
    let interval = Duration::from_millis(interval_ms.unwrap_or(ctx.config.poll_interval_ms).max(50));

    output::info(&format!("Watching {}'s wallet (Ctrl-C to stop)", user.username));
    let _subscriptions = watch_user(&ctx, &user);
    let _session = ctx.auth_service.subscribe_session(|current: Option<User>| match current {
        Some(u) => println!("{} session: {}", stamp(), u.email),
        None => println!("{} session: logged out", stamp()),
    });

    loop {
        thread::sleep(interval);
        ctx.sync_external()?;
    }
}
