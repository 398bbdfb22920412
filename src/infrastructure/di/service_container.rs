//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{GraphService, SessionService};
use crate::config::Settings;
use crate::domain::GraphBuilder;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    pub session: SessionService,
    pub graph: GraphService,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        let settings = Arc::new(settings);
        let session = SessionService::new(Arc::clone(&fs), settings.strict);
        let graph = GraphService::new(fs, GraphBuilder::new(settings.graph.to_options()));

        Self {
            settings,
            session,
            graph,
        }
    }
}
