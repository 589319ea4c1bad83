use std::{fmt::Display, str::FromStr, sync::OnceLock};

use crate::log_errors::LogError;

/// Environment variable holding the lowest level the default loggers print
pub const LOG_LEVEL_ENV: &str = "HG_LOG_LEVEL";

static ENV_LEVEL: OnceLock<LogLevel> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    Critical,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        }
    }

    /// Debug builds print everything by default, release builds start at
    /// `Info`. `HG_LOG_LEVEL` overrides both; unknown values are ignored.
    /// The variable is read once per process.
    pub fn from_env() -> LogLevel {
        *ENV_LEVEL.get_or_init(|| LogLevel::from_var(std::env::var(LOG_LEVEL_ENV).ok().as_deref()))
    }

    fn from_var(value: Option<&str>) -> LogLevel {
        let default = if cfg!(debug_assertions) {
            LogLevel::Debug
        } else {
            LogLevel::Info
        };

        value
            .and_then(|value| value.parse().ok())
            .unwrap_or(default)
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "info" | "log" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "critical" | "fatal" => Ok(LogLevel::Critical),
            _ => Err(LogError::UnknownLevel(s.to_string())),
        }
    }
}
