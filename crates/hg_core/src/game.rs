use std::fmt::Display;

use anyhow::Result;
use hg_memory::Arena;

use crate::timing::DeltaTime;

pub const ENGINE_VERSION: VersionInfo = VersionInfo {
    major: 0,
    minor: 2,
    patch: 0,
    name: "Mercury Engine",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionInfo {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub name: &'static str,
}

impl Display for VersionInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ~ v{}.{}.{}",
            self.name, self.major, self.minor, self.patch
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameControl {
    Continue,
    Exit,
}

/// The hooks a game gives to the engine.
///
/// The engine owns the arena and lends it to every hook. Anything a game keeps
/// between frames lives in the game value itself, usually as handles into the
/// arena.
pub trait Game {
    fn version_info(&self) -> VersionInfo {
        VersionInfo {
            major: 0,
            minor: 0,
            patch: 0,
            name: "NO_NAME_GAME",
        }
    }

    /// Runs once before the first frame.
    fn start(&mut self, arena: &mut Arena) -> Result<()> {
        let _ = arena;
        Ok(())
    }

    /// Runs once per frame.
    fn frame(&mut self, arena: &mut Arena, delta: DeltaTime) -> Result<FrameControl>;

    /// Runs once after the last frame.
    fn end(&mut self, arena: &mut Arena) -> Result<()> {
        let _ = arena;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_version_display() {
        assert_eq!(ENGINE_VERSION.to_string(), "Mercury Engine ~ v0.2.0");
    }
}
