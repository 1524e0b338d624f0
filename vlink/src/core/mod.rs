//! Deterministic, pure logic shared by the linker.
//!
//! Core modules must be free of I/O side effects. They operate on strings and
//! in-memory records and return deterministic outputs suitable for tests.

pub mod env_merge;
pub mod listing;
pub mod table;
pub mod types;
