use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, OnceLock,
    },
    time::{Duration, Instant},
};

use anyhow::Result;
use hg_logger::{core_error, core_info, core_warn, logging_thread_join, logging_thread_running};
use hg_memory::{Arena, StackAllocator};

use crate::{
    app_builder::AppBuilder,
    frame_stats::FrameStats,
    game::{FrameControl, Game, ENGINE_VERSION},
    timing::{DeltaTime, RunningTime},
};

pub use crate::app_errors::AppError;

static TERMINATION_FLAG: OnceLock<Arc<AtomicBool>> = OnceLock::new();

/// Flag raised by Ctrl-C. The handler can only be installed once per process,
/// so every [App] shares this flag.
pub(crate) fn termination_flag() -> Arc<AtomicBool> {
    TERMINATION_FLAG
        .get_or_init(|| {
            let flag = Arc::new(AtomicBool::new(false));
            let handler_flag = flag.clone();
            let result = ctrlc::set_handler(move || handler_flag.store(true, Ordering::SeqCst));
            if let Err(e) = result {
                core_warn!("Failed to set a termination handler: {}", e);
            }
            flag
        })
        .clone()
}

/// Owns the arena and drives a [Game] through its lifetime.
pub struct App {
    pub(crate) name: Box<str>,
    pub(crate) arena: Arena,
    pub(crate) target_frame_time: Duration,
    pub(crate) max_frames: Option<u64>,
    pub(crate) logger_thread: Option<LoggerThreadGuard>,
    pub(crate) stats: FrameStats,
    pub(crate) running_time: RunningTime,
    pub(crate) shutdown: Arc<AtomicBool>,
}

impl App {
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    pub fn into_arena(self) -> Arena {
        self.arena
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn running_time(&self) -> RunningTime {
        self.running_time
    }

    /// Runs `game` until it asks to exit, the frame limit is hit, or Ctrl-C
    /// is pressed. `end` is called even when a frame fails.
    pub fn run<G: Game>(&mut self, game: &mut G) -> Result<()> {
        core_info!("{}", ENGINE_VERSION);
        core_info!("{}", game.version_info());
        core_info!("Running the \"{}\" application", self.name);

        // A Ctrl-C from an earlier run must not stop this one.
        self.shutdown.store(false, Ordering::SeqCst);
        let shutdown = self.shutdown.clone();

        let result = game
            .start(&mut self.arena)
            .and_then(|_| self.frame_loop(game, &shutdown));
        if let Err(e) = &result {
            core_error!("\"{}\" stopped with an error: {:#}", self.name, e);
        }

        let end_result = game.end(&mut self.arena);
        if let Err(e) = &end_result {
            core_error!("Failed to end \"{}\": {:#}", self.name, e);
        }

        self.destroy();
        result.and(end_result)
    }

    fn frame_loop<G: Game>(&mut self, game: &mut G, shutdown: &AtomicBool) -> Result<()> {
        let mut delta = DeltaTime(Duration::ZERO);

        while !shutdown.load(Ordering::SeqCst) {
            if let Some(max_frames) = self.max_frames {
                if self.stats.frames >= max_frames {
                    break;
                }
            }

            let frame_start = Instant::now();
            let control = game.frame(&mut self.arena, delta)?;

            let work = frame_start.elapsed();
            let idle = self.target_frame_time.saturating_sub(work);
            self.stats.record(work, idle, self.arena.used());

            delta = DeltaTime(work + idle);
            self.running_time = RunningTime(self.running_time.0 + delta.0);

            if control == FrameControl::Exit {
                break;
            }

            if !idle.is_zero() {
                std::thread::sleep(idle);
            }
        }

        Ok(())
    }

    fn destroy(&mut self) {
        core_info!(
            "Destroying \"{}\" application after {} frames, peak arena usage {} of {} bytes",
            self.name,
            self.stats.frames,
            self.stats.peak_arena_usage,
            self.arena.capacity()
        );

        match self.arena.live_allocations() {
            Some(live) if live > 0 => core_warn!(
                "{} arena allocations ({} bytes) are still live at shutdown",
                live,
                self.arena.used()
            ),
            None if self.arena.used() > 0 => core_warn!(
                "{} arena bytes are still in use at shutdown",
                self.arena.used()
            ),
            _ => {}
        }

        self.logger_thread = None;
    }
}

/// Stops the logger thread started by [AppBuilder] when dropped.
pub(crate) struct LoggerThreadGuard;

impl Drop for LoggerThreadGuard {
    fn drop(&mut self) {
        if logging_thread_running() {
            if let Err(e) = logging_thread_join() {
                eprintln!("Failed to stop the logger thread: {e}");
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Raises the termination flag from inside a frame, like Ctrl-C would.
    struct Interrupting {
        frames: u64,
        interrupt_at: u64,
    }

    impl Game for Interrupting {
        fn frame(&mut self, _arena: &mut Arena, _delta: DeltaTime) -> Result<FrameControl> {
            self.frames += 1;
            if self.frames == self.interrupt_at {
                termination_flag().store(true, Ordering::SeqCst);
            }
            Ok(FrameControl::Continue)
        }
    }

    fn quick_app(name: &str) -> Result<App> {
        App::builder()
            .name(name)
            .arena_capacity(1024)
            .target_frame_time(Duration::ZERO)
            .max_frames(10)
            .build()
    }

    #[test]
    fn test_termination_stops_every_app() -> Result<()> {
        let mut first = quick_app("first")?;
        let mut second = quick_app("second")?;
        assert!(Arc::ptr_eq(&first.shutdown, &second.shutdown));

        first.run(&mut Interrupting {
            frames: 0,
            interrupt_at: 2,
        })?;
        assert_eq!(first.stats().frames, 2);

        let mut game = Interrupting {
            frames: 0,
            interrupt_at: 4,
        };
        second.run(&mut game)?;
        assert_eq!(second.stats().frames, 4);
        Ok(())
    }
}
