mod sandbox_game;

use anyhow::Result;
use hg_engine::core::App;

use crate::sandbox_game::SandboxGame;

/// All memory the sandbox may ever use at once.
const ALLOC_MEM_SIZE: usize = 64 * 1024 * 1024;

/// Ten seconds at the default frame time.
const MAX_FRAMES: u64 = 600;

fn main() -> Result<()> {
    let mut app = App::builder()
        .name("Hg Sandbox")
        .arena_capacity(ALLOC_MEM_SIZE)
        .arena_alignment(16)
        .max_frames(MAX_FRAMES)
        .with_logger_thread()
        .build()?;

    let mut game = SandboxGame::default();
    app.run(&mut game)
}
