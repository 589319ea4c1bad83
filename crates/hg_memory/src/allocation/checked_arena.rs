use anyhow::Result;
use hg_logger::core_error;

use super::{
    allocation_error::AllocationError,
    allocator::{ArenaHandle, StackAllocator},
    arena_storage::ArenaStorage,
    deallocation_error::DeallocationError,
};

const INITIAL_TRACE_CAPACITY: usize = 20;

/// Stack allocator that remembers every live push and refuses pops that
/// break the allocation order.
///
/// Misuse (popping the wrong handle, passing the wrong size, popping from an
/// empty arena, popping twice) is reported as a
/// [DeallocationError] the moment it happens and leaves the arena as it was.
/// Every mistake is also logged to the core logger.
pub struct CheckedArena {
    storage: ArenaStorage,
    trace: Vec<ArenaHandle>,
}

impl CheckedArena {
    /// Handles of all live allocations, oldest first
    pub fn trace(&self) -> &[ArenaHandle] {
        &self.trace
    }

    fn push(&mut self, size: usize, zeroed: bool) -> Result<ArenaHandle> {
        if self.trace.try_reserve(1).is_err() {
            core_error!("Arena alloc FAILED! Out of memory for the allocation trace!");
            anyhow::bail!(AllocationError::OutOfMemory {
                requested: size,
                available: self.storage.capacity() - self.storage.cursor(),
            })
        }

        let handle = self.storage.reserve(size)?;
        if zeroed {
            self.storage.zero_tail(&handle);
        }
        self.trace.push(handle);
        Ok(handle)
    }

    fn check_live(&self, handle: &ArenaHandle) -> Result<()> {
        self.storage.check_owner(handle)?;
        // Serials grow with every push, so the trace is sorted by them.
        match self.trace.binary_search_by_key(&handle.serial(), ArenaHandle::serial) {
            Ok(index) if self.trace[index] == *handle => Ok(()),
            _ => anyhow::bail!(AllocationError::StaleHandle { handle: *handle }),
        }
    }
}

impl StackAllocator for CheckedArena {
    fn create(capacity: usize, alignment: usize) -> Result<Self> {
        let storage = ArenaStorage::new(capacity, alignment)?;

        let mut trace = Vec::new();
        if trace.try_reserve(INITIAL_TRACE_CAPACITY).is_err() {
            core_error!("Out of memory, can't make arena pointer memory!");
            anyhow::bail!(AllocationError::OutOfMemory {
                requested: capacity,
                available: 0
            })
        }

        Ok(Self { storage, trace })
    }

    fn allocate(&mut self, size: usize) -> Result<ArenaHandle> {
        self.push(size, false)
    }

    fn allocate_zeroed(&mut self, size: usize) -> Result<ArenaHandle> {
        self.push(size, true)
    }

    fn release(&mut self, handle: ArenaHandle, size: usize) -> Result<()> {
        let top = match self.trace.last() {
            Some(top) => *top,
            None => {
                core_error!("No memory pushed in arena! Tried to pop {}", handle);
                anyhow::bail!(DeallocationError::NoActiveAllocation)
            }
        };

        if top != handle {
            core_error!("Wrong handle popped! Expected {}, got {}", top, handle);
            anyhow::bail!(DeallocationError::MismatchedHandle {
                expected: top,
                actual: handle
            })
        }

        let expected = self.storage.cursor() - handle.offset();
        let actual = self.storage.padded(size);
        if actual != Some(expected) {
            core_error!(
                "Wrong size with associated handle {}! Expected {} padded bytes, got {} bytes",
                handle,
                expected,
                size
            );
            anyhow::bail!(DeallocationError::MismatchedSize {
                expected,
                actual: actual.unwrap_or(usize::MAX)
            })
        }

        self.storage.rewind(handle.offset());
        self.trace.pop();
        Ok(())
    }

    fn reset_all(&mut self) {
        self.storage.reset();
        self.trace.clear();
    }

    fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    fn alignment(&self) -> usize {
        self.storage.alignment()
    }

    fn used(&self) -> usize {
        self.storage.cursor()
    }

    fn live_allocations(&self) -> Option<usize> {
        Some(self.trace.len())
    }

    fn bytes(&self, handle: &ArenaHandle) -> Result<&[u8]> {
        self.check_live(handle)?;
        self.storage.bytes(handle)
    }

    fn bytes_mut(&mut self, handle: &ArenaHandle) -> Result<&mut [u8]> {
        self.check_live(handle)?;
        self.storage.bytes_mut(handle)
    }
}
