//! Account commands - signup, login, logout, whoami

use std::env;

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Input, Password};
use wisewallet_core::domain::CURRENCIES;
use wisewallet_core::services::LogEvent;
use wisewallet_core::User;

use super::{get_context, log_event};
use crate::output;

/// Get password from --password flag, WISE_WALLET_PASSWORD env var, or prompt
fn get_password_or_prompt(password_flag: Option<String>, confirm: bool) -> Result<String> {
    if let Some(p) = password_flag {
        return Ok(p);
    }

    if let Ok(p) = env::var("WISE_WALLET_PASSWORD") {
        return Ok(p);
    }

    if atty::isnt(atty::Stream::Stdin) {
        anyhow::bail!("Password required. Use --password or set WISE_WALLET_PASSWORD.");
    }

    let prompt = Password::new().with_prompt("Password");
    let p = if confirm {
        prompt
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()?
    } else {
        prompt.interact()?
    };
    Ok(p)
}

fn input_or_prompt(value: Option<String>, prompt: &str, default: Option<String>) -> Result<String> {
    if let Some(v) = value {
        return Ok(v);
    }
    let mut input = Input::<String>::new().with_prompt(prompt);
    if let Some(d) = default {
        input = input.default(d);
    }
    Ok(input.interact_text()?)
}

fn print_user(user: &User, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(user)?);
    } else {
        println!("  Username: {}", user.username);
        println!("  Email:    {}", user.email);
        println!("  Currency: {}", user.currency);
    }
    Ok(())
}

pub fn run_signup(
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
    currency: Option<String>,
    json: bool,
) -> Result<()> {
    let ctx = get_context()?;
    log_event(&ctx.logger, LogEvent::new("command").with_command("signup"));

    let username = input_or_prompt(username, "Username", None)?;
    let email = input_or_prompt(email, "Email", None)?;
    let currency = match currency {
        Some(c) => c,
        None if json => ctx.config.default_currency.clone(),
        None => {
            let codes: Vec<&str> = CURRENCIES.iter().map(|c| c.code).collect();
            input_or_prompt(
                None,
                &format!("Currency ({})", codes.join(", ")),
                Some(ctx.config.default_currency.clone()),
            )?
        }
    };
    let password = get_password_or_prompt(password, true)?;

    let user = ctx
        .auth_service
        .signup(&username, &email, &password, &currency)?;

    if !json {
        output::success(&format!("Welcome, {}!", user.username));
    }
    print_user(&user, json)
}

pub fn run_login(email: Option<String>, password: Option<String>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    log_event(&ctx.logger, LogEvent::new("command").with_command("login"));

    let email = input_or_prompt(email, "Email", None)?;
    let password = get_password_or_prompt(password, false)?;
    let user = ctx.auth_service.login(&email, &password)?;

    if !json {
        output::success(&format!("Logged in as {}", user.username));
    }
    print_user(&user, json)
}

pub fn run_logout() -> Result<()> {
    let ctx = get_context()?;
    log_event(&ctx.logger, LogEvent::new("command").with_command("logout"));

    if ctx.auth_service.current_user().is_none() {
        output::warning("Not logged in.");
        return Ok(());
    }
    ctx.auth_service.logout()?;
    output::success("Logged out");
    Ok(())
}

pub fn run_whoami(json: bool) -> Result<()> {
    let ctx = get_context()?;

    match ctx.auth_service.current_user() {
        Some(user) => print_user(&user, json),
        None if json => {
            println!("null");
            Ok(())
        }
        None => {
            println!("{}", "Not logged in.".dimmed());
            Ok(())
        }
    }
}
