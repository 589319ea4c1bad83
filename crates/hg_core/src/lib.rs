pub mod app;
pub mod app_builder;
pub mod app_errors;
pub mod frame_stats;
pub mod game;
pub mod timing;

pub use app::*;
pub use app_builder::AppBuilder;
pub use game::{FrameControl, Game, VersionInfo, ENGINE_VERSION};
pub use hg_memory::{Arena, StackAllocator};
