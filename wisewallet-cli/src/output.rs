//! Output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use wisewallet_core::domain::format_amount;

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Format bytes as human-readable size
pub fn format_size(bytes: u64) -> String {
    match bytes {
        b if b >= 1 << 20 => format!("{:.1} MB", b as f64 / (1u64 << 20) as f64),
        b if b >= 1 << 10 => format!("{:.1} KB", b as f64 / (1u64 << 10) as f64),
        b => format!("{} bytes", b),
    }
}

/// Amount in the user's currency, red when negative
pub fn money(amount: Decimal, currency: &str) -> String {
    let text = format_amount(amount, currency);
    if amount.is_sign_negative() && !amount.is_zero() {
        text.red().to_string()
    } else {
        text
    }
}

/// Text progress bar for a 0-100 percentage
pub fn progress_bar(percentage: Decimal, width: usize) -> String {
    let pct = percentage.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
    let filled = (pct * Decimal::from(width as u64) / Decimal::ONE_HUNDRED)
        .round()
        .to_usize()
        .unwrap_or(0)
        .min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Percentage with one decimal
pub fn percent(percentage: Decimal) -> String {
    format!("{}%", percentage.round_dp(1))
}
