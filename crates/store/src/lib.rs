//! Context store implementations for Doppel.
//!
//! The real application keeps this data in a relational database behind
//! an external service; this crate provides the in-process
//! implementations of the same `ContextStore` boundary.

pub mod in_memory;

pub use in_memory::InMemoryStore;
