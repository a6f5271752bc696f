//! Construction parameters for pools, maps and registries.

use crate::error::ConfigError;

/// Configuration for a [`Pool`](crate::Pool).
///
/// Record layout is fixed at construction; all values are immutable after
/// the pool is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Number of records the pool can hold before its first growth.
    ///
    /// Must be non-zero.
    pub initial_capacity: u32,

    /// Size of one record in bytes. Must be non-zero.
    pub record_size: u32,

    /// Alignment of every record in bytes.
    ///
    /// Default: 1. Must be a power of two and at most [`Self::MAX_ALIGNMENT`].
    pub alignment: u32,
}

impl PoolConfig {
    /// Default initial record capacity.
    pub const DEFAULT_INITIAL_CAPACITY: u32 = 64;

    /// Default record alignment.
    pub const DEFAULT_ALIGNMENT: u32 = 1;

    /// Largest supported record alignment (one page).
    pub const MAX_ALIGNMENT: u32 = 4096;

    /// Create a pool config for records of `record_size` bytes.
    ///
    /// Uses default values for all other parameters.
    pub fn new(record_size: u32) -> Self {
        Self {
            initial_capacity: Self::DEFAULT_INITIAL_CAPACITY,
            record_size,
            alignment: Self::DEFAULT_ALIGNMENT,
        }
    }

    /// Set the initial capacity.
    pub fn with_initial_capacity(mut self, initial_capacity: u32) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    /// Set the record alignment.
    pub fn with_alignment(mut self, alignment: u32) -> Self {
        self.alignment = alignment;
        self
    }

    /// Check every parameter, returning the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.record_size == 0 {
            return Err(ConfigError::ZeroRecordSize);
        }
        if self.initial_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if !self.alignment.is_power_of_two() || self.alignment > Self::MAX_ALIGNMENT {
            return Err(ConfigError::InvalidAlignment {
                alignment: self.alignment,
            });
        }
        Ok(())
    }
}

/// Configuration for a [`SparseMap`](crate::SparseMap).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MapConfig {
    /// Number of buckets before the first rehash.
    ///
    /// Must be a non-zero power of two.
    pub initial_capacity: usize,
}

impl MapConfig {
    /// Default initial bucket count.
    pub const DEFAULT_INITIAL_CAPACITY: usize = 64;

    /// Create a map config with the given bucket count.
    pub fn new(initial_capacity: usize) -> Self {
        Self { initial_capacity }
    }

    /// Check every parameter, returning the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.initial_capacity.is_power_of_two() {
            return Err(ConfigError::CapacityNotPowerOfTwo {
                capacity: self.initial_capacity,
            });
        }
        Ok(())
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INITIAL_CAPACITY)
    }
}

/// Configuration for a [`HandleRegistry`](crate::HandleRegistry).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Record storage parameters.
    pub pool: PoolConfig,
    /// Handle index parameters.
    pub map: MapConfig,
}

impl RegistryConfig {
    /// Create a registry config for records of `record_size` bytes.
    ///
    /// The map starts with the smallest power of two that holds the pool's
    /// initial capacity under the 0.8 load factor.
    pub fn new(record_size: u32) -> Self {
        let pool = PoolConfig::new(record_size);
        Self {
            pool,
            map: MapConfig::new(map_capacity_for(pool.initial_capacity)),
        }
    }

    /// Check both halves of the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pool.validate()?;
        self.map.validate()
    }
}

/// Smallest power-of-two bucket count that keeps `records` entries under the
/// 0.8 load factor.
pub(crate) fn map_capacity_for(records: u32) -> usize {
    let needed = (records as usize * 5).div_ceil(4).max(1);
    needed.next_power_of_two()
}
