//! CLI command implementations

pub mod advice;
pub mod analytics;
pub mod auth;
pub mod budget;
pub mod export;
pub mod goal;
pub mod logs;
pub mod summary;
pub mod tx;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use wisewallet_core::domain::parse_date;
use wisewallet_core::services::logging::log_quietly;
use wisewallet_core::services::{EntryPoint, LogEvent, LoggingService};
use wisewallet_core::{User, WalletContext};

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<Arc<LoggingService>>, event: LogEvent) {
    log_quietly(logger.as_deref(), event);
}

/// Get the wallet directory from environment or default
pub fn get_wallet_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("WISE_WALLET_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".wisewallet"))
        .ok_or_else(|| anyhow!("Could not find home directory. Set WISE_WALLET_DIR."))
}

/// Open a session over the wallet directory
pub fn get_context() -> Result<WalletContext> {
    let wallet_dir = get_wallet_dir()?;
    WalletContext::new(&wallet_dir, EntryPoint::Cli)
        .with_context(|| format!("Failed to open wallet in {:?}", wallet_dir))
}

/// Open a session and resolve the logged-in user
pub fn get_session(command: &str) -> Result<(WalletContext, User)> {
    let ctx = get_context()?;
    log_event(&ctx.logger, LogEvent::new("command").with_command(command));
    let user = ctx
        .auth_service
        .current_user()
        .ok_or_else(|| anyhow!("Not logged in. Run `ww login` or `ww signup` first."))?;
    Ok((ctx, user))
}

/// Parse a user-entered amount
pub fn parse_amount(raw: &str) -> Result<Decimal> {
    raw.trim()
        .parse::<Decimal>()
        .map_err(|_| anyhow!("Invalid amount: {}", raw))
}

/// Id or short id as shown by the list commands
///
/// Empty input would prefix-match every record, so it is rejected.
pub fn parse_id_prefix(raw: &str) -> Result<&str> {
    let id = raw.trim();
    if id.is_empty() {
        anyhow::bail!("An id is required");
    }
    Ok(id)
}

/// Parse a `YYYY-MM-DD` date, defaulting to today
pub fn parse_date_or_today(raw: Option<&str>) -> Result<NaiveDate> {
    match raw {
        Some(d) => parse_date(d).map_err(|e| anyhow!(e)),
        None => Ok(Local::now().date_naive()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_prefix_rejects_empty() {
        assert!(parse_id_prefix("").is_err());
        assert!(parse_id_prefix("   ").is_err());
        assert_eq!(parse_id_prefix(" 3f2a ").unwrap(), "3f2a");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount(" 12.50 ").unwrap(), Decimal::new(1250, 2));
        assert!(parse_amount("twelve").is_err());
    }
}
