use std::{
    alloc::Layout,
    ptr::NonNull,
    sync::atomic::{AtomicU64, Ordering},
};

use anyhow::Result;
use hg_logger::{core_debug, core_error};

use super::{
    allocation_error::AllocationError,
    allocator::{padded_size, ArenaHandle},
};

static NEXT_ARENA_ID: AtomicU64 = AtomicU64::new(0);

/// The fixed block of memory behind an arena, together with its bump cursor.
///
/// The block is zeroed once when it is allocated, so every byte is
/// initialized and handing out slices of it is always sound. Everything about
/// allocation order is left to the arena that owns the storage.
pub struct ArenaStorage {
    id: u64,
    start: NonNull<u8>,
    layout: Layout,
    alignment: usize,
    cursor: usize,
    next_serial: u64,
}

// The storage owns its block exclusively, like a `Box<[u8]>`.
unsafe impl Send for ArenaStorage {}

impl ArenaStorage {
    pub fn new(capacity: usize, alignment: usize) -> Result<Self> {
        if capacity == 0 || alignment == 0 {
            core_error!(
                "Can't make an arena with capacity {} and alignment {}",
                capacity,
                alignment
            );
            anyhow::bail!(AllocationError::InvalidConfiguration {
                capacity,
                alignment
            })
        }

        // Addresses can only be aligned to powers of two. Other multiples
        // still pad sizes, but the block itself is byte aligned.
        let block_align = if alignment.is_power_of_two() {
            alignment
        } else {
            1
        };

        let out_of_memory = || {
            core_error!("Out of memory, can't make arena data memory!");
            AllocationError::OutOfMemory {
                requested: capacity,
                available: 0,
            }
        };

        let layout =
            Layout::from_size_align(capacity, block_align).map_err(|_| out_of_memory())?;
        let start = NonNull::new(unsafe { std::alloc::alloc_zeroed(layout) })
            .ok_or_else(out_of_memory)?;

        let id = NEXT_ARENA_ID.fetch_add(1, Ordering::Relaxed);
        core_debug!(
            "Created arena storage {} of {} bytes, padding to multiples of {}",
            id,
            capacity,
            alignment
        );

        Ok(Self {
            id,
            start,
            layout,
            alignment,
            cursor: 0,
            next_serial: 0,
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Fails with [AllocationError::ForeignHandle] for handles handed out by
    /// another arena.
    pub fn check_owner(&self, handle: &ArenaHandle) -> Result<()> {
        if handle.arena_id() != self.id {
            core_error!("Handle {} does not belong to arena {}", handle, self.id);
            anyhow::bail!(AllocationError::ForeignHandle {
                handle: *handle,
                handle_arena: handle.arena_id(),
                arena: self.id,
            })
        }
        Ok(())
    }

    pub fn capacity(&self) -> usize {
        self.layout.size()
    }

    pub fn alignment(&self) -> usize {
        self.alignment
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn padded(&self, size: usize) -> Option<usize> {
        padded_size(size, self.alignment)
    }

    /// Bumps the cursor past a new region. Nothing changes on failure.
    pub fn reserve(&mut self, size: usize) -> Result<ArenaHandle> {
        let available = self.capacity() - self.cursor;
        let padded = match self.padded(size) {
            Some(padded) if padded <= available => padded,
            _ => {
                core_error!(
                    "Arena alloc FAILED! Out of memory! Requested {} bytes, {} available",
                    size,
                    available
                );
                anyhow::bail!(AllocationError::OutOfMemory {
                    requested: size,
                    available
                })
            }
        };

        let handle = ArenaHandle::new(self.id, self.cursor, size, self.next_serial);
        self.cursor += padded;
        self.next_serial = self.next_serial.wrapping_add(1);
        Ok(handle)
    }

    /// Zeroes everything between the start of `handle` and the cursor.
    /// Only meaningful for the most recent reservation.
    pub fn zero_tail(&mut self, handle: &ArenaHandle) {
        let tail = &mut self.as_mut_slice()[handle.offset()..];
        tail.fill(0);
    }

    /// Moves the cursor back to `offset`.
    pub fn rewind(&mut self, offset: usize) {
        debug_assert!(offset <= self.cursor);
        self.cursor = offset;
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    pub fn bytes(&self, handle: &ArenaHandle) -> Result<&[u8]> {
        let range = self.range(handle)?;
        Ok(&self.as_slice()[range])
    }

    pub fn bytes_mut(&mut self, handle: &ArenaHandle) -> Result<&mut [u8]> {
        let range = self.range(handle)?;
        Ok(&mut self.as_mut_slice()[range])
    }

    fn range(&self, handle: &ArenaHandle) -> Result<std::ops::Range<usize>> {
        self.check_owner(handle)?;
        match handle.offset().checked_add(handle.len()) {
            Some(end) if end <= self.cursor => Ok(handle.offset()..end),
            _ => anyhow::bail!(AllocationError::OutOfBounds {
                offset: handle.offset(),
                len: handle.len(),
                used: self.cursor,
            }),
        }
    }

    /// Only the used part of the block
    fn as_slice(&self) -> &[u8] {
        unsafe { std::slice::from_raw_parts(self.start.as_ptr(), self.cursor) }
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        unsafe { std::slice::from_raw_parts_mut(self.start.as_ptr(), self.cursor) }
    }
}

impl Drop for ArenaStorage {
    fn drop(&mut self) {
        core_debug!("Freeing arena storage of {} bytes", self.capacity());
        unsafe { std::alloc::dealloc(self.start.as_ptr(), self.layout) }
    }
}

#[cfg(test)]
mod test {
    use anyhow::Result;

    use super::*;

    #[test]
    fn test_block_is_aligned() -> Result<()> {
        let storage = ArenaStorage::new(256, 64)?;
        assert_eq!(storage.start.as_ptr() as usize % 64, 0);
        Ok(())
    }

    #[test]
    fn test_non_power_of_two_alignment() -> Result<()> {
        let mut storage = ArenaStorage::new(48, 12)?;
        let first = storage.reserve(5)?;
        assert_eq!(first.offset(), 0);
        assert_eq!(storage.cursor(), 12);

        let second = storage.reserve(13)?;
        assert_eq!(second.offset(), 12);
        assert_eq!(storage.cursor(), 36);
        assert!(storage.reserve(13).is_err());
        Ok(())
    }

    #[test]
    fn test_reserve_failure_keeps_state() -> Result<()> {
        let mut storage = ArenaStorage::new(64, 16)?;
        storage.reserve(40)?;
        let err = storage.reserve(20).unwrap_err();
        assert_eq!(
            err.downcast_ref::<AllocationError>(),
            Some(&AllocationError::OutOfMemory {
                requested: 20,
                available: 16
            })
        );
        assert_eq!(storage.cursor(), 48);

        let err = storage.reserve(usize::MAX).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AllocationError>(),
            Some(AllocationError::OutOfMemory { .. })
        ));
        assert_eq!(storage.cursor(), 48);
        Ok(())
    }

    #[test]
    fn test_invalid_configuration() {
        for (capacity, alignment) in [(0, 16), (64, 0)] {
            let err = ArenaStorage::new(capacity, alignment).err().unwrap();
            assert_eq!(
                err.downcast_ref::<AllocationError>(),
                Some(&AllocationError::InvalidConfiguration {
                    capacity,
                    alignment
                })
            );
        }
    }

    #[test]
    fn test_host_refuses_huge_block() {
        for capacity in [usize::MAX, isize::MAX as usize - 64] {
            let err = ArenaStorage::new(capacity, 16).err().unwrap();
            assert_eq!(
                err.downcast_ref::<AllocationError>(),
                Some(&AllocationError::OutOfMemory {
                    requested: capacity,
                    available: 0
                })
            );
        }
    }

    #[test]
    fn test_storages_have_distinct_ids() -> Result<()> {
        let mut first = ArenaStorage::new(64, 16)?;
        let mut second = ArenaStorage::new(64, 16)?;
        assert_ne!(first.id(), second.id());

        let handle = first.reserve(8)?;
        second.reserve(8)?;
        let err = second.bytes(&handle).unwrap_err();
        assert_eq!(
            err.downcast_ref::<AllocationError>(),
            Some(&AllocationError::ForeignHandle {
                handle,
                handle_arena: first.id(),
                arena: second.id(),
            })
        );
        assert_eq!(first.bytes(&handle)?.len(), 8);
        Ok(())
    }

    #[test]
    fn test_bytes_out_of_bounds() -> Result<()> {
        let mut storage = ArenaStorage::new(64, 16)?;
        let handle = storage.reserve(8)?;
        assert_eq!(storage.bytes(&handle)?.len(), 8);

        storage.reset();
        let err = storage.bytes(&handle).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AllocationError>(),
            Some(AllocationError::OutOfBounds { used: 0, .. })
        ));
        Ok(())
    }
}
