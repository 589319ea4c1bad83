pub mod allocation_error;
pub mod allocator;
pub mod arena;
pub mod arena_storage;
pub mod checked_arena;
pub mod deallocation_error;
pub mod unchecked_arena;
