use crate::error::{HarvestError, Result};
use chrono::{Local, NaiveDateTime};
use env_logger::{Env, Target};
use log::Level;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

const TIMESTAMP_FORMAT: &str = "%Y %m %d %H:%M:%S";

/// Renders one log line: `2026 10 19 08:15:02 | WARNING | message`
pub fn format_line(at: NaiveDateTime, level: Level, message: &str) -> String {
    let level = match level {
        Level::Warn => "WARNING",
        other => other.as_str(),
    };
    format!("{} | {} | {}", at.format(TIMESTAMP_FORMAT), level, message)
}

/// Sends all log output to `path`, appending. `RUST_LOG` overrides `default_filter`.
pub fn init(path: &Path, default_filter: &str) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format(|buf, record| {
            writeln!(
                buf,
                "{}",
                format_line(Local::now().naive_local(), record.level(), &record.args().to_string())
            )
        })
        .target(Target::Pipe(Box::new(file)))
        .try_init()
        .map_err(|e| HarvestError::Config(format!("logger already initialized: {}", e)))
}
