//! Repository Module
//!
//! State storage for the server. Jobs live in an in-memory registry.

pub mod job;

// Re-export for convenience
pub use job as job_repository;
pub use job::{JobRegistry, JobUpdate, RegistryError, RunToken};
