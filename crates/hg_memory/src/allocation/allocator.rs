use std::fmt::Display;

use anyhow::Result;
use bytemuck::Pod;

use super::allocation_error::AllocationError;

/// Opaque token for a region handed out by a [StackAllocator].
///
/// Handles are only created by allocators. Two handles are equal only if they
/// come from the same push of the same arena, even when zero-sized pushes
/// share an offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArenaHandle {
    arena: u64,
    offset: usize,
    len: usize,
    serial: u64,
}

impl ArenaHandle {
    pub(crate) fn new(arena: u64, offset: usize, len: usize, serial: u64) -> Self {
        Self {
            arena,
            offset,
            len,
            serial,
        }
    }

    /// Id of the arena that handed out this handle
    pub fn arena_id(&self) -> u64 {
        self.arena
    }

    /// Offset of the region from the start of the arena storage
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Requested size of the region, without padding
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn serial(&self) -> u64 {
        self.serial
    }
}

impl Display for ArenaHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}#{}@{}+{}",
            self.arena, self.serial, self.offset, self.len
        )
    }
}

/// Rounds `size` up to the next multiple of `alignment`.
/// Returns `None` if the result does not fit into `usize`.
pub const fn padded_size(size: usize, alignment: usize) -> Option<usize> {
    let rem = size % alignment;
    if rem == 0 {
        Some(size)
    } else {
        size.checked_add(alignment - rem)
    }
}

/// An allocator that hands out memory from a fixed block and takes it back in
/// strict reverse order.
///
/// There are two implementations: [CheckedArena](crate::CheckedArena)
/// verifies every pop against the allocation order, while
/// [UncheckedArena](crate::UncheckedArena) only keeps a cursor. Pick one at
/// build time through the [Arena](crate::Arena) alias.
pub trait StackAllocator: Sized {
    /// Allocates `capacity` bytes of backing storage.
    ///
    /// # Errors
    ///
    /// [AllocationError::InvalidConfiguration] if `capacity` or `alignment`
    /// is zero, [AllocationError::OutOfMemory] if the host cannot provide the
    /// storage.
    fn create(capacity: usize, alignment: usize) -> Result<Self>;

    /// Pushes a region of at least `size` bytes. The contents are whatever a
    /// previous user of the memory left there.
    ///
    /// # Errors
    ///
    /// [AllocationError::OutOfMemory] if the padded size does not fit. The
    /// allocator is left untouched.
    fn allocate(&mut self, size: usize) -> Result<ArenaHandle>;

    /// Same as [allocate](StackAllocator::allocate), with the whole padded
    /// region set to zero.
    fn allocate_zeroed(&mut self, size: usize) -> Result<ArenaHandle>;

    /// Pops the region behind `handle`. `size` is the size originally
    /// requested; it is padded before being compared.
    ///
    /// # Errors
    ///
    /// One of the [DeallocationError](crate::DeallocationError) variants.
    /// The allocator is left untouched on error.
    fn release(&mut self, handle: ArenaHandle, size: usize) -> Result<()>;

    /// Drops every live allocation at once.
    fn reset_all(&mut self);

    /// Gives the backing storage back to the host. Outstanding handles become
    /// useless.
    fn destroy(self) {
        drop(self)
    }

    fn capacity(&self) -> usize;

    fn alignment(&self) -> usize;

    /// Bytes currently in use, padding included
    fn used(&self) -> usize;

    /// Number of live allocations, if the allocator keeps track of them
    fn live_allocations(&self) -> Option<usize>;

    fn remaining(&self) -> usize {
        self.capacity() - self.used()
    }

    fn bytes(&self, handle: &ArenaHandle) -> Result<&[u8]>;

    fn bytes_mut(&mut self, handle: &ArenaHandle) -> Result<&mut [u8]>;

    /// Copies `data` into a new allocation.
    fn push_bytes(&mut self, data: &[u8]) -> Result<ArenaHandle> {
        let handle = self.allocate(data.len())?;
        self.bytes_mut(&handle)?.copy_from_slice(data);
        Ok(handle)
    }

    /// Copies a plain-old-data value into a new allocation.
    fn push_value<T: Pod>(&mut self, value: &T) -> Result<ArenaHandle> {
        self.push_bytes(bytemuck::bytes_of(value))
    }

    fn read_value<T: Pod>(&self, handle: &ArenaHandle) -> Result<T> {
        let bytes = self.bytes(handle)?;
        check_value_size::<T>(bytes.len())?;
        Ok(bytemuck::pod_read_unaligned(bytes))
    }

    fn write_value<T: Pod>(&mut self, handle: &ArenaHandle, value: &T) -> Result<()> {
        let bytes = self.bytes_mut(handle)?;
        check_value_size::<T>(bytes.len())?;
        bytes.copy_from_slice(bytemuck::bytes_of(value));
        Ok(())
    }
}

fn check_value_size<T>(len: usize) -> Result<()> {
    if std::mem::size_of::<T>() != len {
        anyhow::bail!(AllocationError::TypeMismatch {
            type_name: std::any::type_name::<T>(),
            type_size: std::mem::size_of::<T>(),
            len,
        })
    }
    Ok(())
}
