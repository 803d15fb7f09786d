//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `login_tracker` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::process;

use login_tracker::config::{Command, Opt};
use login_tracker::initialization::init_logger_with;
use login_tracker::{Config, LoginTracker, NoticeLevel, RecordOutcome, Subscription};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists), falling back to
    // one next to the executable
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let opt = Opt::parse();
    let config = Config::from(&opt);

    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    if let Err(e) = run(opt.command, &config).await {
        eprintln!("login_tracker error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}

async fn run(command: Command, config: &Config) -> Result<()> {
    let tracker = LoginTracker::init(config).await?;
    let mut notices = tracker.notifications().subscribe();

    let result = dispatch(command, &tracker).await;
    print_notices(&mut notices);
    result
}

async fn dispatch(command: Command, tracker: &LoginTracker) -> Result<()> {
    match command {
        Command::Resolve => {
            let lookup = tracker.resolve().await;
            tracker.resolver().stats().log_summary();
            print_json(&lookup)
        }
        Command::AddUser { name, email, role } => {
            let user = tracker.add_user(&name, &email, role).await?;
            println!("Created {} {} ({})", user.role, user.email, user.id);
            Ok(())
        }
        Command::Login { email } => {
            let outcome = tracker.login(&email).await;
            tracker.resolver().stats().log_summary();
            let outcome = outcome?;
            if let RecordOutcome::Recorded(entry) = &outcome.recorded {
                println!(
                    "Logged in {} from {} ({}, {})",
                    outcome.user.email, entry.ip_address, entry.city, entry.country
                );
            }
            Ok(())
        }
        Command::History { email, limit } => {
            let history = tracker.history(&email, limit).await?;
            print_json(&history)
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

fn print_notices(notices: &mut Subscription) {
    while let Some(notice) = notices.try_recv() {
        let line = match notice.level {
            NoticeLevel::Success => format!("✔ {}", notice.message).green(),
            NoticeLevel::Error => format!("✖ {}", notice.message).red(),
            NoticeLevel::Warning => format!("⚠ {}", notice.message).yellow(),
            NoticeLevel::Info => format!("ℹ {}", notice.message).cyan(),
        };
        eprintln!("{line}");
    }
}
