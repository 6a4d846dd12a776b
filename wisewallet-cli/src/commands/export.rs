//! Export command - write transactions to CSV or JSON

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use wisewallet_core::services::ExportFormat;

use super::get_session;
use crate::output;

pub fn run(format: &str, output_path: Option<PathBuf>, stdout: bool) -> Result<()> {
    let (ctx, user) = get_session("export")?;
    let format: ExportFormat = format.parse().map_err(|e: String| anyhow!(e))?;

    let transactions = ctx.transaction_service.list_transactions(&user);
    let content = ctx.export_service.render(format, &transactions)?;

    // Piped output without an explicit file goes to stdout
    if stdout || (output_path.is_none() && atty::isnt(atty::Stream::Stdout)) {
        print!("{}", content);
        return Ok(());
    }

    let path = output_path.unwrap_or_else(|| {
        PathBuf::from(ctx.export_service.file_name(format, Local::now().date_naive()))
    });
    std::fs::write(&path, content).with_context(|| format!("Failed to write {:?}", path))?;

    output::success(&format!(
        "Exported {} transactions to {}",
        transactions.len(),
        path.display()
    ));
    Ok(())
}
