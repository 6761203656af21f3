//! In-memory store
//!
//! Implements every repository port over process memory with the same
//! transactional contract as PostgreSQL: the toggle unit reads, yields, and
//! commits only if the target's version is unchanged, retrying otherwise.
//! Used by the integration suite and for running the API without a database.

mod store;

pub use store::MemoryStore;
