//! Domain layer: descriptor model, field validation, and graph aggregation
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod builder;
pub mod document;
pub mod entities;
pub mod error;
pub mod graph;
pub mod path;
pub mod tree;
pub mod validation;

pub use builder::{GraphBuilder, GraphOptions};
pub use document::DescriptorDocument;
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use graph::{
    aggregate, regroup, GraphDocument, GroupTag, GroupedGraph, GroupedLink, Node, RawLink,
};
pub use path::{FieldPath, PatternOwner};
pub use tree::DescriptorTree;
pub use validation::FieldKind;
