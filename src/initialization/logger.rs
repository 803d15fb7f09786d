//! Logger setup for the library and CLI.
//!
//! Both output formats go to stderr so `resolve` and `history` can print
//! JSON on stdout.

use std::io::Write;

use crate::config::LogFormat;
use crate::error_handling::InitializationError;
use colored::*;
use log::LevelFilter;

/// Installs the global `env_logger` logger.
///
/// `RUST_LOG` is read first and `level` then overrides it for this crate and
/// as the default. `sqlx`, `reqwest` and `hyper` stay capped at `info`.
///
/// `LogFormat::Plain` prints a local time, colored level, target and message;
/// `LogFormat::Json` prints one object per line with `ts`, `level`,
/// `target` and `msg`.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already
/// installed in this process.
///
/// # Examples
///
/// ```bash
/// RUST_LOG=debug login_tracker resolve
/// login_tracker --log-level warn --log-format json login --email ada@example.com
/// ```
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    colored::control::set_override(true);

    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level);
    builder.filter_module("sqlx", LevelFilter::Info);
    builder.filter_module("reqwest", LevelFilter::Info);
    builder.filter_module("hyper", LevelFilter::Info);
    builder.filter_module("hyper_util", LevelFilter::Info);
    builder.filter_module("login_tracker", level);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{{\"ts\":\"{}\",\"level\":\"{}\",\"target\":\"{}\",\"msg\":{}}}",
                    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
                    record.level(),
                    record.target(),
                    serde_json::to_string(&record.args().to_string())
                        .unwrap_or_else(|_| "\"\"".into())
                )
            });
        }
        LogFormat::Plain => {
            builder.format(|buf, record| {
                let level = match record.level() {
                    log::Level::Error => "ERROR".red().bold(),
                    log::Level::Warn => "WARN ".yellow(),
                    log::Level::Info => "INFO ".green(),
                    log::Level::Debug => "DEBUG".blue(),
                    log::Level::Trace => "TRACE".purple(),
                };
                writeln!(
                    buf,
                    "{} {} {}: {}",
                    chrono::Local::now().format("%H:%M:%S%.3f").to_string().dimmed(),
                    level,
                    record.target().cyan(),
                    record.args()
                )
            });
        }
    }

    builder.try_init().map_err(InitializationError::from)?;

    Ok(())
}
