use std::time::Duration;

use anyhow::Result;
use hg_logger::{core_info, logging_thread_start};
use hg_memory::{Arena, StackAllocator};

use crate::{
    app::{termination_flag, LoggerThreadGuard}, app_errors::AppError, frame_stats::FrameStats, timing::RunningTime,
    App,
};

pub const DEFAULT_ARENA_CAPACITY: usize = 64 * 1024 * 1024;
pub const DEFAULT_ARENA_ALIGNMENT: usize = 16;
pub const DEFAULT_TARGET_FRAME_TIME: Duration = Duration::from_millis(16);

const MAX_TARGET_FRAME_TIME: Duration = Duration::from_secs(1);

pub struct AppBuilder {
    pub name: Option<Box<str>>,
    pub arena_capacity: usize,
    pub arena_alignment: usize,
    pub target_frame_time: Duration,
    pub max_frames: Option<u64>,
    pub start_logger_thread: bool,
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self {
            name: None,
            arena_capacity: DEFAULT_ARENA_CAPACITY,
            arena_alignment: DEFAULT_ARENA_ALIGNMENT,
            target_frame_time: DEFAULT_TARGET_FRAME_TIME,
            max_frames: None,
            start_logger_thread: false,
        }
    }
}

impl AppBuilder {
    pub fn new() -> AppBuilder {
        AppBuilder::default()
    }

    pub fn name(mut self, name: &str) -> AppBuilder {
        self.name = Some(name.into());
        self
    }

    /// Size of the single arena every subsystem allocates from.
    pub fn arena_capacity(mut self, bytes: usize) -> AppBuilder {
        self.arena_capacity = bytes;
        self
    }

    pub fn arena_alignment(mut self, alignment: usize) -> AppBuilder {
        self.arena_alignment = alignment;
        self
    }

    /// Frames finishing early sleep for the rest of this duration.
    pub fn target_frame_time(mut self, frame_time: Duration) -> AppBuilder {
        self.target_frame_time = frame_time;
        self
    }

    pub fn max_frames(mut self, frames: u64) -> AppBuilder {
        self.max_frames = Some(frames);
        self
    }

    /// Moves log output to a background thread for the lifetime of the app.
    pub fn with_logger_thread(mut self) -> AppBuilder {
        self.start_logger_thread = true;
        self
    }

    pub fn build(mut self) -> Result<App> {
        let name = self.name.take().ok_or(AppError::MissingName)?;

        if self.target_frame_time > MAX_TARGET_FRAME_TIME {
            anyhow::bail!(AppError::FrameTimeTooLong(self.target_frame_time))
        }

        let arena = Arena::create(self.arena_capacity, self.arena_alignment)?;

        let logger_thread = if self.start_logger_thread {
            logging_thread_start(None)?;
            core_info!("Started the logger thread!");
            Some(LoggerThreadGuard)
        } else {
            None
        };

        core_info!(
            "Created a {} byte arena for \"{}\" (alignment {})",
            arena.capacity(),
            name,
            arena.alignment()
        );

        Ok(App {
            name,
            arena,
            target_frame_time: self.target_frame_time,
            max_frames: self.max_frames,
            logger_thread,
            stats: FrameStats::default(),
            running_time: RunningTime::default(),
            shutdown: termination_flag(),
        })
    }
}
