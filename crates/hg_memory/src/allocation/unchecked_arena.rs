use anyhow::Result;
use hg_logger::core_error;

use super::{
    allocator::{ArenaHandle, StackAllocator},
    arena_storage::ArenaStorage,
    deallocation_error::DeallocationError,
};

/// Stack allocator that only keeps a cursor.
///
/// Pops subtract the padded size from the cursor. The only misuse it notices
/// is popping more than is in use; a wrong handle or a wrong order goes
/// through and corrupts later allocations. Use [CheckedArena](crate::CheckedArena)
/// while developing.
pub struct UncheckedArena {
    storage: ArenaStorage,
}

impl StackAllocator for UncheckedArena {
    fn create(capacity: usize, alignment: usize) -> Result<Self> {
        Ok(Self {
            storage: ArenaStorage::new(capacity, alignment)?,
        })
    }

    fn allocate(&mut self, size: usize) -> Result<ArenaHandle> {
        self.storage.reserve(size)
    }

    fn allocate_zeroed(&mut self, size: usize) -> Result<ArenaHandle> {
        let handle = self.storage.reserve(size)?;
        self.storage.zero_tail(&handle);
        Ok(handle)
    }

    fn release(&mut self, handle: ArenaHandle, size: usize) -> Result<()> {
        let used = self.storage.cursor();
        match self.storage.padded(size) {
            Some(padded) if padded <= used => {
                self.storage.rewind(used - padded);
                Ok(())
            }
            padded => {
                core_error!(
                    "Wrong size with associated handle {}! Popping {} bytes, {} in use",
                    handle,
                    size,
                    used
                );
                anyhow::bail!(DeallocationError::MismatchedSize {
                    expected: used,
                    actual: padded.unwrap_or(usize::MAX)
                })
            }
        }
    }

    fn reset_all(&mut self) {
        self.storage.reset();
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
        None
    }

    fn bytes(&self, handle: &ArenaHandle) -> Result<&[u8]> {
        self.storage.bytes(handle)
    }

    fn bytes_mut(&mut self, handle: &ArenaHandle) -> Result<&mut [u8]> {
        self.storage.bytes_mut(handle)
    }
}

#[cfg(test)]
mod test {
    use anyhow::Result;

    use super::*;

    #[test]
    fn test_release_beyond_cursor() -> Result<()> {
        let mut arena = UncheckedArena::create(64, 16)?;
        let a = arena.allocate(10)?;

        let err = arena.release(a, 17).unwrap_err();
        assert_eq!(
            err.downcast_ref::<DeallocationError>(),
            Some(&DeallocationError::MismatchedSize {
                expected: 16,
                actual: 32
            })
        );
        assert_eq!(arena.used(), 16);

        arena.release(a, 10)?;
        assert_eq!(arena.used(), 0);
        Ok(())
    }

    // Order is not verified here; this pins down the documented gap.
    #[test]
    fn test_out_of_order_release_goes_unnoticed() -> Result<()> {
        let mut arena = UncheckedArena::create(64, 16)?;
        let a = arena.allocate(16)?;
        let b = arena.allocate(16)?;

        arena.release(a, 16)?;
        assert_eq!(arena.used(), 16);
        arena.release(b, 16)?;
        assert_eq!(arena.used(), 0);
        assert_eq!(arena.live_allocations(), None);
        Ok(())
    }

    #[test]
    fn test_release_on_empty_arena() -> Result<()> {
        let mut arena = UncheckedArena::create(64, 16)?;
        let a = arena.allocate(0)?;
        arena.release(a, 0)?;

        let err = arena.release(a, 1).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DeallocationError>(),
            Some(DeallocationError::MismatchedSize { expected: 0, .. })
        ));
        Ok(())
    }
}
