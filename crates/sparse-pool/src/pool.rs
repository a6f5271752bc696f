//! Growable slot pool for fixed-size byte records.
//!
//! A [`Pool`] stores records of one fixed size and alignment in a single
//! contiguous buffer. Records are addressed by dense [`SlotIndex`] values
//! that stay valid across growth. Freed slots go on a LIFO stack and are
//! handed out again before the pool extends its high-water mark.

use std::fmt;

use smallvec::SmallVec;

use crate::bits::align_up;
use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::handle::SlotIndex;

/// Free-slot stack. The first eight entries live inline; beyond that the
/// stack spills to the heap and doubles on each growth.
type FreeStack = SmallVec<[u32; 8]>;

/// Growable arena of fixed-size, fixed-alignment records.
///
/// Backing storage holds `capacity * stride + alignment - 1` bytes so the
/// first record can start at an aligned address; `stride` is the record size
/// rounded up to the alignment.
///
/// Hot-path accessors ([`record`](Self::record), [`read`](Self::read),
/// [`free`](Self::free)) check liveness with debug assertions only. Use the
/// `try_*` variants for validated access.
pub struct Pool {
    /// Backing bytes. Never resized after allocation, so the buffer address
    /// (and with it `base`) is fixed until the next growth.
    storage: Vec<u8>,
    /// Offset of slot 0 within `storage`.
    base: usize,
    /// Number of records `storage` can hold.
    capacity: u32,
    /// High-water mark: slots `[0, count)` have been handed out at least once.
    count: u32,
    record_size: usize,
    alignment: usize,
    stride: usize,
    free_slots: FreeStack,
}

/// Allocate zeroed storage for `capacity` records, returning the buffer and
/// the offset of its first aligned byte.
fn allocate_storage(
    capacity: u32,
    stride: usize,
    alignment: usize,
) -> Result<(Vec<u8>, usize), PoolError> {
    let bytes = (capacity as usize)
        .checked_mul(stride)
        .and_then(|b| b.checked_add(alignment - 1))
        .ok_or(PoolError::CapacityExceeded { capacity })?;

    let mut storage = Vec::new();
    storage
        .try_reserve_exact(bytes)
        .map_err(|_| PoolError::OutOfMemory {
            requested_bytes: bytes,
        })?;
    storage.resize(bytes, 0);

    let addr = storage.as_ptr() as usize;
    let base = addr.wrapping_neg() & (alignment - 1);
    Ok((storage, base))
}

impl Pool {
    /// Create a pool from a validated configuration.
    pub fn new(config: PoolConfig) -> Result<Self, PoolError> {
        config.validate()?;
        let record_size = config.record_size as usize;
        let alignment = config.alignment as usize;
        let stride = align_up(record_size, alignment).ok_or(PoolError::CapacityExceeded {
            capacity: config.initial_capacity,
        })?;
        let (storage, base) = allocate_storage(config.initial_capacity, stride, alignment)?;
        Ok(Self {
            storage,
            base,
            capacity: config.initial_capacity,
            count: 0,
            record_size,
            alignment,
            stride,
            free_slots: FreeStack::new(),
        })
    }

    /// Shorthand for [`Pool::new`] with an explicit layout.
    pub fn with_layout(
        initial_capacity: u32,
        record_size: u32,
        alignment: u32,
    ) -> Result<Self, PoolError> {
        Self::new(
            PoolConfig::new(record_size)
                .with_initial_capacity(initial_capacity)
                .with_alignment(alignment),
        )
    }

    /// Store a record and return its slot.
    ///
    /// Reuses the most recently freed slot if there is one; otherwise appends
    /// at the high-water mark, doubling capacity first when full. Growth
    /// copies every existing record to the same slot in the new buffer.
    ///
    /// On error the pool is unchanged.
    pub fn push(&mut self, record: &[u8]) -> Result<SlotIndex, PoolError> {
        self.check_record_len(record.len())?;
        self.push_with(|bytes| bytes.copy_from_slice(record))
    }

    /// Claim a slot and let `fill` write the record in place.
    ///
    /// `fill` sees the slot's previous bytes (zeroes for a never-used slot).
    pub(crate) fn push_with<F>(&mut self, fill: F) -> Result<SlotIndex, PoolError>
    where
        F: FnOnce(&mut [u8]),
    {
        if let Some(slot) = self.free_slots.pop() {
            fill(self.slot_bytes_mut(slot));
            return Ok(SlotIndex(slot));
        }

        if self.count == self.capacity {
            self.grow()?;
        }

        let slot = self.count;
        self.count += 1;
        fill(self.slot_bytes_mut(slot));
        Ok(SlotIndex(slot))
    }

    /// Borrow a live record.
    ///
    /// The slot must have been returned by [`push`](Self::push) and not freed
    /// since; debug builds assert this.
    ///
    /// # Panics
    ///
    /// Panics if `slot` lies beyond the allocated storage.
    #[inline]
    pub fn record(&self, slot: SlotIndex) -> &[u8] {
        self.debug_assert_live(slot);
        self.slot_bytes(slot.0)
    }

    /// Mutably borrow a live record.
    ///
    /// Same preconditions as [`record`](Self::record).
    ///
    /// # Panics
    ///
    /// Panics if `slot` lies beyond the allocated storage.
    #[inline]
    pub fn record_mut(&mut self, slot: SlotIndex) -> &mut [u8] {
        self.debug_assert_live(slot);
        self.slot_bytes_mut(slot.0)
    }

    /// Copy a live record into `out`.
    ///
    /// # Panics
    ///
    /// Panics if `out.len()` differs from the record size, or if `slot` lies
    /// beyond the allocated storage.
    #[inline]
    pub fn read(&self, slot: SlotIndex, out: &mut [u8]) {
        out.copy_from_slice(self.record(slot));
    }

    /// Borrow a record after checking that the slot is live.
    pub fn try_record(&self, slot: SlotIndex) -> Result<&[u8], PoolError> {
        self.check_live(slot)?;
        Ok(self.slot_bytes(slot.0))
    }

    /// Copy a record into `out` after checking the slot and buffer length.
    pub fn try_read(&self, slot: SlotIndex, out: &mut [u8]) -> Result<(), PoolError> {
        self.check_record_len(out.len())?;
        out.copy_from_slice(self.try_record(slot)?);
        Ok(())
    }

    /// Return a slot to the free stack.
    ///
    /// The record bytes are left untouched. Freeing a slot twice corrupts the
    /// free stack; debug builds assert against it. Fails only if the free
    /// stack cannot grow, in which case nothing changes.
    pub fn free(&mut self, slot: SlotIndex) -> Result<(), PoolError> {
        debug_assert!(
            slot.0 < self.count,
            "freeing slot {slot} beyond high-water mark {}",
            self.count
        );
        debug_assert!(
            !self.free_slots.contains(&slot.0),
            "double free of slot {slot}"
        );

        self.reserve_free_slot()?;
        self.free_slots.push(slot.0);
        Ok(())
    }

    /// Make sure the next [`free`](Self::free) cannot fail.
    pub(crate) fn reserve_free_slot(&mut self) -> Result<(), PoolError> {
        if self.free_slots.len() < self.free_slots.capacity() {
            return Ok(());
        }
        let old = self.free_slots.capacity();
        self.free_slots
            .try_reserve(1)
            .map_err(|_| PoolError::OutOfMemory {
                requested_bytes: old * 2 * std::mem::size_of::<u32>(),
            })?;
        tracing::debug!(
            old_capacity = old,
            new_capacity = self.free_slots.capacity(),
            "pool free stack grew"
        );
        Ok(())
    }

    /// Free a slot after checking that it is live.
    ///
    /// Rejects out-of-range slots and double frees instead of corrupting the
    /// free stack.
    pub fn try_free(&mut self, slot: SlotIndex) -> Result<(), PoolError> {
        self.check_live(slot)?;
        self.free(slot)
    }

    /// Whether `slot` currently holds a record. O(free slots).
    pub fn is_live(&self, slot: SlotIndex) -> bool {
        slot.0 < self.count && !self.free_slots.contains(&slot.0)
    }

    /// Live slots in ascending order.
    pub fn live_slots(&self) -> impl Iterator<Item = SlotIndex> + '_ {
        let freed = self.freed_mask();
        (0..self.count)
            .filter(move |&slot| !freed[slot as usize])
            .map(SlotIndex)
    }

    /// Release the pool, first passing every live record to `on_free`.
    ///
    /// Records are visited once each, in ascending slot order. Freed slots
    /// are skipped.
    pub fn destroy_with<F>(mut self, mut on_free: F)
    where
        F: FnMut(&mut [u8]),
    {
        let freed = self.freed_mask();
        let mut finalized = 0usize;
        for slot in 0..self.count {
            if !freed[slot as usize] {
                on_free(self.slot_bytes_mut(slot));
                finalized += 1;
            }
        }
        tracing::debug!(
            finalized,
            high_water_mark = self.count,
            "pool destroyed"
        );
    }

    /// Release the pool without finalizing records.
    pub fn destroy(self) {
        drop(self);
    }

    /// Number of records the current storage can hold.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Number of slots ever handed out (live or freed).
    pub fn high_water_mark(&self) -> u32 {
        self.count
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.count as usize - self.free_slots.len()
    }

    /// Whether the pool holds no live records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of slots waiting on the free stack.
    pub fn free_count(&self) -> usize {
        self.free_slots.len()
    }

    /// Record size in bytes.
    pub fn record_size(&self) -> usize {
        self.record_size
    }

    /// Record alignment in bytes.
    pub fn alignment(&self) -> usize {
        self.alignment
    }

    /// Distance between consecutive records in bytes.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Size of the backing storage in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.storage.len()
    }

    fn grow(&mut self) -> Result<(), PoolError> {
        let old_capacity = self.capacity;
        let new_capacity = old_capacity
            .checked_mul(2)
            .ok_or(PoolError::CapacityExceeded {
                capacity: old_capacity,
            })?;
        let (mut storage, base) = allocate_storage(new_capacity, self.stride, self.alignment)?;

        let used = self.count as usize * self.stride;
        storage[base..base + used].copy_from_slice(&self.storage[self.base..self.base + used]);

        self.storage = storage;
        self.base = base;
        self.capacity = new_capacity;
        tracing::debug!(
            old_capacity,
            new_capacity,
            record_size = self.record_size,
            "pool grew"
        );
        Ok(())
    }

    #[inline]
    fn slot_bytes(&self, slot: u32) -> &[u8] {
        let start = self.base + slot as usize * self.stride;
        &self.storage[start..start + self.record_size]
    }

    #[inline]
    fn slot_bytes_mut(&mut self, slot: u32) -> &mut [u8] {
        let start = self.base + slot as usize * self.stride;
        &mut self.storage[start..start + self.record_size]
    }

    fn freed_mask(&self) -> Vec<bool> {
        let mut freed = vec![false; self.count as usize];
        for &slot in &self.free_slots {
            freed[slot as usize] = true;
        }
        freed
    }

    pub(crate) fn check_record_len(&self, len: usize) -> Result<(), PoolError> {
        if len != self.record_size {
            return Err(PoolError::RecordSizeMismatch {
                expected: self.record_size,
                actual: len,
            });
        }
        Ok(())
    }

    fn check_live(&self, slot: SlotIndex) -> Result<(), PoolError> {
        if slot.0 >= self.count {
            return Err(PoolError::SlotOutOfRange {
                slot,
                high_water_mark: self.count,
            });
        }
        if self.free_slots.contains(&slot.0) {
            return Err(PoolError::SlotNotLive { slot });
        }
        Ok(())
    }

    #[inline]
    fn debug_assert_live(&self, slot: SlotIndex) {
        debug_assert!(
            slot.0 < self.count,
            "slot {slot} beyond high-water mark {}",
            self.count
        );
        debug_assert!(
            !self.free_slots.contains(&slot.0),
            "access to freed slot {slot}"
        );
    }
}

impl fmt::Debug for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("record_size", &self.record_size)
            .field("alignment", &self.alignment)
            .field("capacity", &self.capacity)
            .field("high_water_mark", &self.count)
            .field("free", &self.free_slots.len())
            .finish_non_exhaustive()
    }
}
