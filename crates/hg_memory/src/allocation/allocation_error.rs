use thiserror::Error;

use super::allocator::ArenaHandle;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    #[error("Not enough memory to allocate {requested} bytes, only {available} bytes available")]
    OutOfMemory { requested: usize, available: usize },
    #[error("Cannot create an arena with capacity {capacity} and alignment {alignment}: both must be positive")]
    InvalidConfiguration { capacity: usize, alignment: usize },
    #[error("Handle to {len} bytes at offset {offset} is outside of the {used} bytes in use")]
    OutOfBounds {
        offset: usize,
        len: usize,
        used: usize,
    },
    #[error("Handle {handle} belongs to arena {handle_arena}, not to arena {arena}")]
    ForeignHandle {
        handle: ArenaHandle,
        handle_arena: u64,
        arena: u64,
    },
    #[error("Handle {handle} refers to an allocation that was already popped")]
    StaleHandle { handle: ArenaHandle },
    #[error("Type mismatch: {type_name} is {type_size} bytes, the allocation holds {len}")]
    TypeMismatch {
        type_name: &'static str,
        type_size: usize,
        len: usize,
    },
}
