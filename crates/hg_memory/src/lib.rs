pub mod allocation;
pub use allocation::{
    allocation_error::AllocationError,
    allocator::*,
    arena::Arena,
    arena_storage::ArenaStorage,
    checked_arena::CheckedArena,
    deallocation_error::DeallocationError,
    unchecked_arena::UncheckedArena,
};
