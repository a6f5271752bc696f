//! Handle-keyed record storage.
//!
//! [`HandleRegistry`] pairs a [`Pool`] with a [`SparseMap`]: the pool owns the
//! record bytes, the map resolves each external [`Handle`] to the record's
//! [`SlotIndex`]. Every operation keeps the two in step, so a handle is
//! registered exactly when its slot is live.

use std::fmt;

use crate::config::RegistryConfig;
use crate::error::RegistryError;
use crate::handle::{Handle, SlotIndex};
use crate::map::SparseMap;
use crate::pool::Pool;

/// Result of [`HandleRegistry::insert`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Insertion {
    /// The handle was new; its record went into this slot.
    Inserted(SlotIndex),
    /// The handle was already registered; its record was overwritten in place.
    Replaced(SlotIndex),
}

impl Insertion {
    /// The slot holding the record.
    pub fn slot(self) -> SlotIndex {
        match self {
            Self::Inserted(slot) | Self::Replaced(slot) => slot,
        }
    }
}

/// Fixed-size records addressed by opaque 64-bit handles.
pub struct HandleRegistry {
    pool: Pool,
    map: SparseMap,
}

impl HandleRegistry {
    /// Create a registry from a validated configuration.
    pub fn new(config: RegistryConfig) -> Result<Self, RegistryError> {
        config.validate()?;
        Ok(Self {
            pool: Pool::new(config.pool)?,
            map: SparseMap::new(config.map)?,
        })
    }

    /// Create a registry for `record_size`-byte records with default sizing.
    pub fn with_record_size(record_size: u32) -> Result<Self, RegistryError> {
        Self::new(RegistryConfig::new(record_size))
    }

    /// Store `record` under `handle`.
    ///
    /// A handle that is already registered keeps its slot and has its record
    /// overwritten. On error nothing changes.
    pub fn insert(&mut self, handle: Handle, record: &[u8]) -> Result<Insertion, RegistryError> {
        self.pool.check_record_len(record.len())?;

        if let Some(slot) = self.map.get(handle.0) {
            let slot = SlotIndex(slot);
            self.pool.record_mut(slot).copy_from_slice(record);
            return Ok(Insertion::Replaced(slot));
        }

        // Reserve room to hand the slot back if the map cannot take the entry.
        self.pool.reserve_free_slot()?;
        let slot = self.pool.push(record)?;
        if let Err(e) = self.map.insert(handle.0, slot.0) {
            self.pool.free(slot)?;
            return Err(e.into());
        }
        Ok(Insertion::Inserted(slot))
    }

    /// Borrow the record for `handle`.
    pub fn get(&self, handle: Handle) -> Option<&[u8]> {
        let slot = self.map.get(handle.0)?;
        Some(self.pool.record(SlotIndex(slot)))
    }

    /// Mutably borrow the record for `handle`.
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut [u8]> {
        let slot = self.map.get(handle.0)?;
        Some(self.pool.record_mut(SlotIndex(slot)))
    }

    /// Copy the record for `handle` into `out`.
    pub fn read(&self, handle: Handle, out: &mut [u8]) -> Result<(), RegistryError> {
        let slot = self
            .slot_of(handle)
            .ok_or(RegistryError::UnknownHandle { handle })?;
        self.pool.try_read(slot, out)?;
        Ok(())
    }

    /// The slot currently holding `handle`'s record.
    pub fn slot_of(&self, handle: Handle) -> Option<SlotIndex> {
        self.map.get(handle.0).map(SlotIndex)
    }

    /// Whether `handle` is registered.
    pub fn contains(&self, handle: Handle) -> bool {
        self.map.contains_key(handle.0)
    }

    /// Unregister `handle` and free its slot.
    ///
    /// Returns the freed slot, or `None` if the handle was not registered.
    /// On error nothing changes.
    pub fn remove(&mut self, handle: Handle) -> Result<Option<SlotIndex>, RegistryError> {
        if !self.map.contains_key(handle.0) {
            return Ok(None);
        }
        self.pool.reserve_free_slot()?;
        let Some(slot) = self.map.remove(handle.0) else {
            return Ok(None);
        };
        let slot = SlotIndex(slot);
        self.pool.free(slot)?;
        Ok(Some(slot))
    }

    /// Registered handles with their records, in map table order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &[u8])> + '_ {
        self.map
            .iter()
            .map(|(key, slot)| (Handle(key), self.pool.record(SlotIndex(slot))))
    }

    /// Number of registered handles.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether no handles are registered.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// The record pool.
    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// The handle index.
    pub fn map(&self) -> &SparseMap {
        &self.map
    }

    /// Release the registry, passing every live record to `on_free` in
    /// ascending slot order.
    pub fn destroy_with<F>(self, on_free: F)
    where
        F: FnMut(&mut [u8]),
    {
        tracing::debug!(handles = self.map.len(), "handle registry destroyed");
        self.pool.destroy_with(on_free);
    }
}

impl fmt::Debug for HandleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandleRegistry")
            .field("pool", &self.pool)
            .field("map", &self.map)
            .finish()
    }
}
