use std::fs::OpenOptions;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use env_logger::{Env, Target};
use log::LevelFilter;

/// Log levels as written in kart.cfg and on the command line
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Nothing = 0,
    /// Messages meant for the player; always shown unless logging is off
    User = 1,
    Error = 2,
    Warning = 3,
    Info = 4,
    Debug = 5,
    All = 6,
}

impl LogLevel {
    /// Create a LogLevel from an integer
    pub fn from_i32(level: i32) -> Self {
        match level {
            0 => LogLevel::Nothing,
            1 => LogLevel::User,
            2 => LogLevel::Error,
            3 => LogLevel::Warning,
            4 => LogLevel::Info,
            5 => LogLevel::Debug,
            6 => LogLevel::All,
            _ => LogLevel::Info,
        }
    }

    pub fn as_i32(&self) -> i32 {
        *self as i32
    }

    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Nothing => LevelFilter::Off,
            LogLevel::User | LogLevel::Error => LevelFilter::Error,
            LogLevel::Warning => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::All => LevelFilter::Trace,
        }
    }
}

impl FromStr for LogLevel {
    type Err = anyhow::Error;

    /// Accepts a level name or its number
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(level) = s.parse::<i32>() {
            if !(0..=6).contains(&level) {
                anyhow::bail!("Log level {} out of range (0 to 6)", level);
            }
            return Ok(LogLevel::from_i32(level));
        }
        match s.to_lowercase().as_str() {
            "nothing" | "off" => Ok(LogLevel::Nothing),
            "user" => Ok(LogLevel::User),
            "error" => Ok(LogLevel::Error),
            "warning" | "warn" => Ok(LogLevel::Warning),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "all" | "trace" => Ok(LogLevel::All),
            _ => anyhow::bail!(
                "Invalid log level: {}. Valid options: nothing, user, error, warning, info, debug, all",
                s
            ),
        }
    }
}

/// Install the global logger.
///
/// Without an explicit level `RUST_LOG` decides, falling back to `info`.
/// With a log file, output is appended there instead of stderr.
pub fn init(level: Option<LogLevel>, log_file: Option<&Path>) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    if let Some(level) = level {
        builder.filter_level(level.to_level_filter());
    }

    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        builder.target(Target::Pipe(Box::new(file)));
        builder.write_style(env_logger::WriteStyle::Never);
    }

    builder
        .format_timestamp_millis()
        .try_init()
        .context("Logger already initialized")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_log_level_from_i32() {
        assert_eq!(LogLevel::from_i32(0), LogLevel::Nothing);
        assert_eq!(LogLevel::from_i32(1), LogLevel::User);
        assert_eq!(LogLevel::from_i32(3), LogLevel::Warning);
        assert_eq!(LogLevel::from_i32(6), LogLevel::All);
    }

    #[test]
    fn test_log_level_as_i32() {
        assert_eq!(LogLevel::Nothing.as_i32(), 0);
        assert_eq!(LogLevel::Debug.as_i32(), 5);
    }

    #[test]
    fn test_log_level_invalid() {
        // Invalid values should default to Info
        assert_eq!(LogLevel::from_i32(100), LogLevel::Info);
        assert_eq!(LogLevel::from_i32(-1), LogLevel::Info);
    }

    #[rstest]
    #[case(LogLevel::Nothing, LevelFilter::Off)]
    #[case(LogLevel::User, LevelFilter::Error)]
    #[case(LogLevel::Error, LevelFilter::Error)]
    #[case(LogLevel::Warning, LevelFilter::Warn)]
    #[case(LogLevel::Info, LevelFilter::Info)]
    #[case(LogLevel::Debug, LevelFilter::Debug)]
    #[case(LogLevel::All, LevelFilter::Trace)]
    fn test_level_filter(#[case] level: LogLevel, #[case] filter: LevelFilter) {
        assert_eq!(level.to_level_filter(), filter);
    }

    #[rstest]
    #[case("debug", LogLevel::Debug)]
    #[case("WARN", LogLevel::Warning)]
    #[case("2", LogLevel::Error)]
    #[case(" all ", LogLevel::All)]
    fn test_parse_level(#[case] text: &str, #[case] level: LogLevel) {
        assert_eq!(text.parse::<LogLevel>().unwrap(), level);
    }

    #[test]
    fn test_parse_level_invalid() {
        assert!("loud".parse::<LogLevel>().is_err());
        assert!("9".parse::<LogLevel>().is_err());
    }
}
