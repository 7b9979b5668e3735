//! # feedroll core
//!
//! Pure logic for feedroll: the persisted dataset model, the incremental
//! filter, the windowed merge engine, day fingerprinting for change
//! detection, and the [`store::Store`] abstraction.
//!
//! This crate contains no tokio, HTTP, or filesystem I/O. Everything here
//! is deterministic given its inputs (the merge engine takes `today` as a
//! parameter), which keeps the invariants testable in isolation.

pub mod filter;
pub mod fingerprint;
pub mod merge;
pub mod models;
pub mod store;
