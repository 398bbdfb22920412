//! Dependency graph service
//!
//! Loads descriptor and graph documents and turns them into drawable graphs.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt, JsonResultExt};
use crate::domain::{DescriptorDocument, GraphBuilder, GraphDocument, GroupedGraph};
use crate::infrastructure::traits::FileSystem;

/// Service for building and aggregating dependency graphs.
pub struct GraphService {
    fs: Arc<dyn FileSystem>,
    builder: GraphBuilder,
}

impl GraphService {
    pub fn new(fs: Arc<dyn FileSystem>, builder: GraphBuilder) -> Self {
        Self { fs, builder }
    }

    fn read(&self, path: &Path, what: &str) -> ApplicationResult<String> {
        if !self.fs.exists(path) {
            return Err(ApplicationError::InputNotFound(path.to_path_buf()));
        }
        self.fs.read_to_string(path).with_path_context(what, path)
    }

    pub fn load_descriptor(&self, path: &Path) -> ApplicationResult<DescriptorDocument> {
        let content = self.read(path, "read descriptor")?;
        DescriptorDocument::from_json(&content).with_document_context(path)
    }

    pub fn load_graph(&self, path: &Path) -> ApplicationResult<GraphDocument> {
        let content = self.read(path, "read graph")?;
        serde_json::from_str::<GraphDocument>(&content).with_document_context(path)
    }

    /// Build the instance graph of a descriptor and aggregate it.
    pub fn render(&self, document: &DescriptorDocument) -> ApplicationResult<GroupedGraph> {
        Ok(self.builder.render(document)?)
    }

    /// Load a descriptor document file and render its graph.
    #[instrument(skip(self))]
    pub fn render_file(&self, path: &Path) -> ApplicationResult<GroupedGraph> {
        let document = self.load_descriptor(path)?;
        let graph = self.render(&document)?;
        debug!("render_file: {} links", graph.links.len());
        Ok(graph)
    }

    /// Load a raw `{nodes, links}` document and aggregate it.
    #[instrument(skip(self))]
    pub fn aggregate_file(&self, path: &Path) -> ApplicationResult<GroupedGraph> {
        let graph = self.load_graph(path)?;
        Ok(graph.aggregate()?)
    }
}
