//! Service Module
//!
//! Business logic layer of the separation server.
//! Services sit between the HTTP handlers and the registry, engine and store.

pub mod job;
pub mod orchestrator;
pub mod upload;

// Re-export for convenience
pub use job as job_service;
pub use orchestrator::{JobSpec, Orchestrator, OrchestratorError, OrchestratorSettings};
pub use upload as upload_service;
