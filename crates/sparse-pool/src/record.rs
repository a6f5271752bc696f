//! Typed records on top of the byte pool.
//!
//! [`RecordPool`] wraps a [`Pool`] whose layout comes from a [`Record`]
//! implementation, so callers push and fetch values instead of byte slices.

use std::fmt;
use std::marker::PhantomData;

use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::handle::SlotIndex;
use crate::pool::Pool;

/// A value with a fixed-size byte encoding.
///
/// `encode` must fill all of `out`, which is always exactly `SIZE` bytes;
/// `decode` receives the same `SIZE` bytes back.
pub trait Record: Sized {
    /// Encoded size in bytes. Must be non-zero.
    const SIZE: u32;
    /// Alignment of each record in the pool.
    const ALIGN: u32 = 1;

    /// Write `self` into `out`.
    fn encode(&self, out: &mut [u8]);

    /// Read a value back from `bytes`.
    fn decode(bytes: &[u8]) -> Self;
}

macro_rules! impl_record_for_primitive {
    ($($ty:ty),*) => {
        $(
            impl Record for $ty {
                const SIZE: u32 = std::mem::size_of::<$ty>() as u32;
                const ALIGN: u32 = std::mem::align_of::<$ty>() as u32;

                fn encode(&self, out: &mut [u8]) {
                    out.copy_from_slice(&self.to_le_bytes());
                }

                fn decode(bytes: &[u8]) -> Self {
                    let mut buf = [0u8; std::mem::size_of::<$ty>()];
                    buf.copy_from_slice(bytes);
                    <$ty>::from_le_bytes(buf)
                }
            }
        )*
    };
}

impl_record_for_primitive!(u16, u32, u64, i32, i64, f32, f64);

impl<const N: usize> Record for [u8; N] {
    const SIZE: u32 = N as u32;

    fn encode(&self, out: &mut [u8]) {
        out.copy_from_slice(self);
    }

    fn decode(bytes: &[u8]) -> Self {
        let mut buf = [0u8; N];
        buf.copy_from_slice(bytes);
        buf
    }
}

/// A [`Pool`] of typed records.
pub struct RecordPool<R: Record> {
    pool: Pool,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> RecordPool<R> {
    /// Create a pool with room for `initial_capacity` records.
    pub fn new(initial_capacity: u32) -> Result<Self, PoolError> {
        let config = PoolConfig::new(R::SIZE)
            .with_initial_capacity(initial_capacity)
            .with_alignment(R::ALIGN);
        Ok(Self {
            pool: Pool::new(config)?,
            _record: PhantomData,
        })
    }

    /// Store a record and return its slot.
    pub fn push(&mut self, record: &R) -> Result<SlotIndex, PoolError> {
        self.pool.push_with(|bytes| record.encode(bytes))
    }

    /// Decode a live record.
    ///
    /// # Panics
    ///
    /// Panics if `slot` lies beyond the allocated storage.
    pub fn get(&self, slot: SlotIndex) -> R {
        R::decode(self.pool.record(slot))
    }

    /// Decode a record after checking that the slot is live.
    pub fn try_get(&self, slot: SlotIndex) -> Result<R, PoolError> {
        self.pool.try_record(slot).map(R::decode)
    }

    /// Overwrite a live record.
    pub fn set(&mut self, slot: SlotIndex, record: &R) {
        record.encode(self.pool.record_mut(slot));
    }

    /// Return a slot for reuse.
    pub fn free(&mut self, slot: SlotIndex) -> Result<(), PoolError> {
        self.pool.free(slot)
    }

    /// Live records with their slots, in ascending slot order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotIndex, R)> + '_ {
        self.pool
            .live_slots()
            .map(|slot| (slot, R::decode(self.pool.record(slot))))
    }

    /// Release the pool, passing every live record to `on_free` in
    /// ascending slot order.
    pub fn destroy_with<F>(self, mut on_free: F)
    where
        F: FnMut(R),
    {
        self.pool.destroy_with(|bytes| on_free(R::decode(bytes)));
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.pool.len()
    }

    /// Whether the pool holds no live records.
    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// The underlying byte pool.
    pub fn as_pool(&self) -> &Pool {
        &self.pool
    }
}

impl<R: Record> fmt::Debug for RecordPool<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordPool")
            .field("record", &std::any::type_name::<R>())
            .field("pool", &self.pool)
            .finish()
    }
}
