use std::{fmt::Display, sync::OnceLock};

use crate::escape_sequence;

use super::log_level::LogLevel;

pub type TerminalEscapeCode = u8;

pub const RESET: TerminalEscapeCode = 0;
pub const BOLD: TerminalEscapeCode = 1;
pub const DIM: TerminalEscapeCode = 2;

pub const RED: TerminalEscapeCode = 31;
pub const YELLOW: TerminalEscapeCode = 33;
pub const CYAN: TerminalEscapeCode = 36;
pub const WHITE: TerminalEscapeCode = 37;

/// Setting this variable to anything non-empty turns terminal colors off.
pub const NO_COLOR_ENV: &str = "NO_COLOR";

static COLORS_ENABLED: OnceLock<bool> = OnceLock::new();

pub const fn bg_color(color: TerminalEscapeCode) -> TerminalEscapeCode {
    color + 10
}

/// Whether terminal targets get escape sequences. Read once per process.
pub fn colors_enabled() -> bool {
    *COLORS_ENABLED.get_or_init(|| colors_allowed(std::env::var_os(NO_COLOR_ENV).as_deref()))
}

fn colors_allowed(no_color: Option<&std::ffi::OsStr>) -> bool {
    no_color.map_or(true, |value| value.is_empty())
}

/// A `CSI <codes> m` sequence, written as `\x1b[1;31m`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalEscapeSequence(pub Vec<TerminalEscapeCode>);

impl Display for TerminalEscapeSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("\x1b[")?;
        for (i, code) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{code}")?;
        }
        f.write_str("m")
    }
}

impl From<&LogLevel> for TerminalEscapeSequence {
    fn from(value: &LogLevel) -> Self {
        match value {
            LogLevel::Debug => escape_sequence!(DIM, WHITE),
            LogLevel::Info => escape_sequence!(CYAN),
            LogLevel::Warn => escape_sequence!(YELLOW),
            LogLevel::Error => escape_sequence!(BOLD, RED),
            LogLevel::Critical => escape_sequence!(bg_color(RED), WHITE, BOLD),
        }
    }
}

impl From<TerminalEscapeCode> for TerminalEscapeSequence {
    fn from(value: TerminalEscapeCode) -> Self {
        escape_sequence!(value)
    }
}

#[cfg(test)]
mod test {
    use std::ffi::OsStr;

    use super::*;

    #[test]
    fn test_sequence_formatting() {
        let seq = escape_sequence!(bg_color(RED), WHITE, BOLD);
        assert_eq!(seq.to_string(), "\x1b[41;37;1m");
        assert_eq!(TerminalEscapeSequence::from(RESET).to_string(), "\x1b[0m");
        assert_eq!(escape_sequence!().to_string(), "\x1b[m");
    }

    #[test]
    fn test_level_colors_differ() {
        let info = TerminalEscapeSequence::from(&LogLevel::Info);
        let error = TerminalEscapeSequence::from(&LogLevel::Error);
        assert_ne!(info, error);
        assert_eq!(error.to_string(), "\x1b[1;31m");
    }

    #[test]
    fn test_no_color_variable() {
        assert!(colors_allowed(None));
        assert!(colors_allowed(Some(OsStr::new(""))));
        assert!(!colors_allowed(Some(OsStr::new("1"))));
        assert_eq!(colors_enabled(), colors_enabled());
    }
}
