//! Integration test utilities for the binge notification engine
//!
//! This crate spawns the REST API over the in-memory store and a manual
//! clock so end-to-end scenarios run without external services.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
