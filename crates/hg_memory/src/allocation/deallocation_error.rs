use thiserror::Error;

use super::allocator::ArenaHandle;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeallocationError {
    /// Nothing has been pushed that could be popped
    #[error("No memory pushed in the arena")]
    NoActiveAllocation,
    /// The handle is not the most recent live allocation
    #[error("Wrong handle popped: expected {expected}, got {actual}")]
    MismatchedHandle {
        expected: ArenaHandle,
        actual: ArenaHandle,
    },
    /// Sizes are compared after padding to the arena alignment
    #[error("Wrong size for the popped handle: expected {expected} padded bytes, got {actual}")]
    MismatchedSize { expected: usize, actual: usize },
}
