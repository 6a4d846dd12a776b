//! Advice command - ask the assistant about recent spending

use anyhow::Result;
use colored::Colorize;

use super::get_session;
use crate::output;

pub fn run(json: bool) -> Result<()> {
    let (ctx, user) = get_session("advice")?;
    let transactions = ctx.transaction_service.list_transactions(&user);

    if !ctx.advice_service.is_configured() && !json {
        output::warning("No API key configured. Set GEMINI_API_KEY or advice.apiKey in settings.json.");
    }

    let runtime = tokio::runtime::Runtime::new()?;
    let advice = runtime.block_on(ctx.advice_service.get_advice(&transactions));

    if json {
        println!("{}", serde_json::json!({ "advice": advice }));
    } else {
        println!("{}", "WiseBot".bold().cyan());
        println!("{}", advice);
    }
    Ok(())
}
