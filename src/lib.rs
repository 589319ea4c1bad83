pub use hg_core as core;
pub use hg_logger as log;
pub use hg_memory as memory;
