use std::{fs::OpenOptions, io::Write, path::PathBuf};

use crate::{
    colors_enabled, escape_sequence, log_errors::LogError, log_level::LogLevel,
    TerminalEscapeSequence, RESET,
};

pub const CORE_LOGGER_NAME: &str = "core";
pub const APP_LOGGER_NAME: &str = "app";

const TIMESTAMP_FORMAT: &str = "%H:%M:%S%.3f";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogTarget {
    Stdout,
    Stderr,
    File(PathBuf),
}

/// A message travelling from a logging macro to the logger thread.
#[derive(Debug)]
pub struct LogMessage {
    pub logger_name: &'static str,
    pub level: LogLevel,
    pub msg: String,
    pub shutdown: bool,
}

#[derive(Debug, Clone)]
pub struct Logger {
    pub name: &'static str,
    pub min_level: LogLevel,
    pub label: &'static str,
    pub targets: Vec<LogTarget>,
}

impl Default for Logger {
    fn default() -> Self {
        Self {
            name: "system",
            min_level: LogLevel::from_env(),
            label: "System",
            targets: vec![LogTarget::Stdout, LogTarget::Stderr],
        }
    }
}

impl Logger {
    pub fn default_core() -> Self {
        Self {
            name: CORE_LOGGER_NAME,
            label: "Engine",
            ..Default::default()
        }
    }

    pub fn default_app() -> Self {
        Self {
            name: APP_LOGGER_NAME,
            label: "App",
            ..Default::default()
        }
    }

    /// Falls back to a generic logger for names that have no default.
    pub fn default_for(name: &'static str) -> Self {
        match name {
            CORE_LOGGER_NAME => Self::default_core(),
            APP_LOGGER_NAME => Self::default_app(),
            _ => Self {
                name,
                ..Default::default()
            },
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn log(&self, level: LogLevel, msg: &str) {
        if level < self.min_level {
            return;
        }

        for target in self.targets.iter() {
            if let Err(e) = self.log_to_target(target, level, msg) {
                eprintln!("{e}");
            }
        }
    }

    /// Errors and above go to stderr only, everything else to stdout only.
    /// File targets receive every level.
    pub fn accepts(target: &LogTarget, level: LogLevel) -> bool {
        match target {
            LogTarget::Stdout => level < LogLevel::Error,
            LogTarget::Stderr => level >= LogLevel::Error,
            LogTarget::File(_) => true,
        }
    }

    pub fn format_line(&self, level: LogLevel, msg: &str, colored: bool) -> String {
        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT);
        if colored {
            format!(
                "{}{} {} [{}]: {}{}",
                TerminalEscapeSequence::from(&level),
                timestamp,
                self.label,
                level,
                msg,
                escape_sequence!(RESET)
            )
        } else {
            format!("{} {} [{}]: {}", timestamp, self.label, level, msg)
        }
    }

    fn log_to_target(&self, target: &LogTarget, level: LogLevel, msg: &str) -> Result<(), LogError> {
        if !Self::accepts(target, level) {
            return Ok(());
        }
        match target {
            LogTarget::Stdout => {
                println!("{}", self.format_line(level, msg, colors_enabled()));
                Ok(())
            }
            LogTarget::Stderr => {
                eprintln!("{}", self.format_line(level, msg, colors_enabled()));
                Ok(())
            }
            LogTarget::File(path) => {
                let mut file = OpenOptions::new()
                    .append(true)
                    .create(true)
                    .open(path)
                    .map_err(|e| LogError::CouldNotOpenFile {
                        path: path.display().to_string(),
                        source: e,
                    })?;

                let line = format!("{}\n", self.format_line(level, msg, false));
                file.write_all(line.as_bytes())
                    .map_err(|e| LogError::CouldNotWriteToFile {
                        path: path.display().to_string(),
                        source: e,
                    })
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_targets_split_by_level() {
        assert!(Logger::accepts(&LogTarget::Stdout, LogLevel::Info));
        assert!(!Logger::accepts(&LogTarget::Stdout, LogLevel::Error));
        assert!(Logger::accepts(&LogTarget::Stderr, LogLevel::Critical));
        assert!(!Logger::accepts(&LogTarget::Stderr, LogLevel::Warn));
        assert!(Logger::accepts(
            &LogTarget::File("engine.log".into()),
            LogLevel::Debug
        ));
    }

    #[test]
    fn test_plain_line_has_no_escape_codes() {
        let logger = Logger::default_core();
        let line = logger.format_line(LogLevel::Warn, "arena is 90% full", false);
        assert!(line.ends_with("Engine [WARN]: arena is 90% full"));
        assert!(!line.contains('\x1b'));
    }

    #[test]
    fn test_file_target_respects_min_level() {
        let path = std::env::temp_dir().join(format!("hg_logger_test_{}.log", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let logger = Logger {
            name: "file_test",
            min_level: LogLevel::Info,
            label: "Test",
            targets: vec![LogTarget::File(path.clone())],
        };
        logger.log(LogLevel::Debug, "hidden");
        logger.log(LogLevel::Info, "shown");
        logger.log(LogLevel::Error, "also shown");

        let contents = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert!(!contents.contains("hidden"));
        assert!(contents.contains("Test [INFO]: shown"));
        assert!(contents.contains("Test [ERROR]: also shown"));
        assert_eq!(contents.lines().count(), 2);
    }

    #[test]
    fn test_default_for_known_names() {
        assert_eq!(Logger::default_for(CORE_LOGGER_NAME).label, "Engine");
        assert_eq!(Logger::default_for(APP_LOGGER_NAME).label, "App");
        assert_eq!(Logger::default_for("render").name(), "render");
    }
}
