//! Growable slot pool and Robin Hood handle map.
//!
//! Virtualizes sparse, externally issued 64-bit handles (driver objects,
//! pointer-like IDs) onto dense `u32` slots in a fixed-record pool, so
//! per-handle state stays packed and slots are recycled after deletion.
//!
//! # Architecture
//!
//! ```text
//! HandleRegistry (composition)
//! ├── SparseMap: Handle(u64) → slot (u32)
//! │   └── Bucket[] (power-of-two, Robin Hood, backward-shift delete)
//! └── Pool: slot → record bytes
//!     ├── aligned Vec<u8> (doubling growth, slot indices stable)
//!     └── free stack (LIFO reuse)
//! ```
//!
//! [`Pool`] and [`SparseMap`] are independent and usable on their own;
//! [`HandleRegistry`] keeps one of each in step. [`RecordPool`] puts typed
//! access over a pool for values implementing [`Record`].
//!
//! # Threading
//!
//! Nothing here locks. All mutation goes through `&mut self`; callers that
//! share a registry across threads wrap it in their own mutex.
//!
//! # Allocation failure
//!
//! Growth uses fallible reservation. A failed growth returns an
//! `OutOfMemory` error and leaves the structure as it was.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod bits;
pub mod config;
pub mod error;
pub mod handle;
pub mod map;
pub mod pool;
pub mod record;
pub mod registry;

// Public re-exports for the primary API surface.
pub use config::{MapConfig, PoolConfig, RegistryConfig};
pub use error::{ConfigError, MapError, PoolError, RegistryError};
pub use handle::{Handle, SlotIndex};
pub use map::SparseMap;
pub use pool::Pool;
pub use record::{Record, RecordPool};
pub use registry::{HandleRegistry, Insertion};
