//! Stem separation server
//!
//! Accepts separation jobs over HTTP, runs them in the background and keeps
//! their state in memory for clients to poll.

pub mod api;
pub mod config;
pub mod engine;
pub mod repository;
pub mod service;
pub mod store;

use std::sync::Arc;

use crate::config::Config;
use crate::engine::{CommandEngine, SeparationEngine};
use crate::repository::JobRegistry;
use crate::service::{Orchestrator, OrchestratorSettings};
use crate::store::{ContentStore, LocalContentStore};

/// Shared state handed to every request handler
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<JobRegistry>,
    pub orchestrator: Arc<Orchestrator>,
    pub store: Arc<dyn ContentStore>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire up state with the given engine and store
    pub fn new(
        config: Config,
        engine: Arc<dyn SeparationEngine>,
        store: Arc<dyn ContentStore>,
    ) -> Self {
        let registry = Arc::new(JobRegistry::new());
        let orchestrator = Arc::new(Orchestrator::new(
            Arc::clone(&registry),
            engine,
            Arc::clone(&store),
            OrchestratorSettings {
                scratch_dir: config.scratch_dir.clone(),
                processed_prefix: config.processed_prefix.clone(),
            },
        ));

        Self {
            registry,
            orchestrator,
            store,
            config: Arc::new(config),
        }
    }

    /// Command engine and local content store, as configured
    pub fn from_config(config: Config) -> Self {
        let engine = CommandEngine::new(
            config.engine_program.clone(),
            config.engine_args.clone(),
            config.engine_timeout,
        );
        let store = LocalContentStore::new(
            config.storage_dir.clone(),
            format!("{}/files", config.public_url.trim_end_matches('/')),
        );

        Self::new(config, Arc::new(engine), Arc::new(store))
    }
}
