//! Error types for pools, maps and registries.

use std::error::Error;
use std::fmt;

use crate::handle::{Handle, SlotIndex};

/// A configuration parameter was rejected at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Record size of zero bytes.
    ZeroRecordSize,
    /// Initial capacity of zero records.
    ZeroCapacity,
    /// Record alignment is not a supported power of two.
    InvalidAlignment {
        /// The rejected alignment.
        alignment: u32,
    },
    /// Map capacity is zero or not a power of two.
    CapacityNotPowerOfTwo {
        /// The rejected capacity.
        capacity: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroRecordSize => write!(f, "record size must be non-zero"),
            Self::ZeroCapacity => write!(f, "initial capacity must be non-zero"),
            Self::InvalidAlignment { alignment } => {
                write!(
                    f,
                    "alignment {alignment} is not a power of two in 1..=4096"
                )
            }
            Self::CapacityNotPowerOfTwo { capacity } => {
                write!(f, "map capacity {capacity} is not a non-zero power of two")
            }
        }
    }
}

impl Error for ConfigError {}

/// Errors from [`Pool`](crate::Pool) operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PoolError {
    /// The pool configuration was invalid.
    Config(ConfigError),
    /// The system allocator refused a storage request.
    ///
    /// The pool is left exactly as it was before the failing call.
    OutOfMemory {
        /// Size of the refused request in bytes.
        requested_bytes: usize,
    },
    /// Growing would exceed the `u32` slot space or the address space.
    CapacityExceeded {
        /// Capacity (in records) at the time of the failed growth.
        capacity: u32,
    },
    /// A record of the wrong length was pushed or read.
    RecordSizeMismatch {
        /// The pool's record size.
        expected: usize,
        /// The length supplied by the caller.
        actual: usize,
    },
    /// A slot index at or beyond the high-water mark.
    SlotOutOfRange {
        /// The offending slot.
        slot: SlotIndex,
        /// The pool's high-water mark.
        high_water_mark: u32,
    },
    /// A slot that has been freed and not handed out again.
    SlotNotLive {
        /// The offending slot.
        slot: SlotIndex,
    },
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid pool config: {e}"),
            Self::OutOfMemory { requested_bytes } => {
                write!(f, "out of memory: requested {requested_bytes} bytes")
            }
            Self::CapacityExceeded { capacity } => {
                write!(f, "pool capacity exceeded: cannot grow past {capacity} records")
            }
            Self::RecordSizeMismatch { expected, actual } => {
                write!(
                    f,
                    "record size mismatch: expected {expected} bytes, got {actual} bytes"
                )
            }
            Self::SlotOutOfRange {
                slot,
                high_water_mark,
            } => {
                write!(
                    f,
                    "slot {slot} out of range: high-water mark {high_water_mark}"
                )
            }
            Self::SlotNotLive { slot } => write!(f, "slot {slot} is not live"),
        }
    }
}

impl Error for PoolError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for PoolError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Errors from [`SparseMap`](crate::SparseMap) operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MapError {
    /// The map configuration was invalid.
    Config(ConfigError),
    /// The system allocator refused a bucket array.
    ///
    /// The map is left exactly as it was before the failing call.
    OutOfMemory {
        /// Number of buckets requested.
        requested_buckets: usize,
    },
    /// Doubling the bucket count would overflow `usize`.
    CapacityExceeded {
        /// Bucket count at the time of the failed rehash.
        capacity: usize,
    },
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid map config: {e}"),
            Self::OutOfMemory { requested_buckets } => {
                write!(f, "out of memory: requested {requested_buckets} buckets")
            }
            Self::CapacityExceeded { capacity } => {
                write!(f, "map capacity exceeded: cannot grow past {capacity} buckets")
            }
        }
    }
}

impl Error for MapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for MapError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Errors from [`HandleRegistry`](crate::HandleRegistry) operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// The registry configuration was invalid.
    Config(ConfigError),
    /// Record storage failed.
    Pool(PoolError),
    /// The handle index failed.
    Map(MapError),
    /// The handle has no registered record.
    UnknownHandle {
        /// The unrecognised handle.
        handle: Handle,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid registry config: {e}"),
            Self::Pool(e) => write!(f, "record pool: {e}"),
            Self::Map(e) => write!(f, "handle map: {e}"),
            Self::UnknownHandle { handle } => write!(f, "unknown handle: {handle}"),
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Pool(e) => Some(e),
            Self::Map(e) => Some(e),
            Self::UnknownHandle { .. } => None,
        }
    }
}

impl From<PoolError> for RegistryError {
    fn from(e: PoolError) -> Self {
        Self::Pool(e)
    }
}

impl From<MapError> for RegistryError {
    fn from(e: MapError) -> Self {
        Self::Map(e)
    }
}

impl From<ConfigError> for RegistryError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
