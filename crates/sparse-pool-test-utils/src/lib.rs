//! Test utilities for sparse-pool development.
//!
//! Provides a reference model of handle-registry semantics
//! ([`ModelRegistry`]), proptest strategies over registry operations
//! ([`ops`]), and seeded handle generators ([`KeyStream`]) for
//! deterministic stress tests and benchmarks.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod keys;
pub mod model;
pub mod ops;

pub use keys::{record_bytes, KeyStream};
pub use model::ModelRegistry;
pub use ops::{ops, Op};
