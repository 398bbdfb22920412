//! Graph builder deriving the instance-level dependency graph of a descriptor.

use std::num::IntErrorKind;

use tracing::{debug, warn};

use crate::domain::document::DescriptorDocument;
use crate::domain::entities::Microservice;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::graph::{aggregate, GraphDocument, GroupTag, GroupedGraph, Node, RawLink};

/// Knobs for graph building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphOptions {
    /// Maximum drawn instances per service in minimalistic reports.
    pub instance_limit: usize,
    /// Simulation `report` value that switches minimalistic drawing on.
    pub minimalistic_report: String,
    /// Maximum number of nodes in one graph, over all services.
    pub node_limit: usize,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            instance_limit: 10,
            minimalistic_report: "minimalistic".to_string(),
            node_limit: 100_000,
        }
    }
}

/// Constructs node/link graphs from descriptor documents.
///
/// Each microservice becomes one group (its index) with one node per drawn
/// instance; each dependency becomes a raw link between the owning service's
/// group and the group of the first service carrying the referenced name.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    options: GraphOptions,
}

/// Node id of instance `k` of service `i`: `i + instances + count * k`.
fn node_id(i: usize, instances: usize, count: usize, k: usize) -> Option<i64> {
    let offset = count.checked_mul(k)?;
    let id = i.checked_add(instances)?.checked_add(offset)?;
    i64::try_from(id).ok()
}

fn instances_error(service: &Microservice, index: usize, expected: &'static str) -> DomainError {
    DomainError::validation(
        format!("microservices.{}.instances", index),
        service.instances.clone(),
        expected,
    )
}

impl GraphBuilder {
    pub fn new(options: GraphOptions) -> Self {
        Self { options }
    }

    pub fn is_minimalistic(&self, document: &DescriptorDocument) -> bool {
        document.simulation.report == self.options.minimalistic_report
    }

    /// Declared instance count of a service.
    ///
    /// Empty or non-numeric counts (a descriptor still being edited) count as 0;
    /// a numeric count beyond `usize` is an error.
    fn instances(&self, service: &Microservice, index: usize) -> DomainResult<usize> {
        match service.instances.parse::<usize>() {
            Ok(n) => Ok(n),
            Err(e) if *e.kind() == IntErrorKind::PosOverflow => Err(instances_error(
                service,
                index,
                "an instance count that fits in 64 bits",
            )),
            Err(_) => Ok(0),
        }
    }

    /// Number of nodes drawn for a service.
    pub fn drawn_instances(&self, instances: usize, minimalistic: bool) -> usize {
        if minimalistic {
            instances.min(self.options.instance_limit)
        } else {
            instances
        }
    }

    /// Build the raw graph document for `document`.
    ///
    /// Dependencies naming no live service are skipped: they are weak references
    /// and may be stale while the descriptor is being edited. Instance counts
    /// that would exceed the node limit or overflow a node id are rejected.
    pub fn build(&self, document: &DescriptorDocument) -> DomainResult<GraphDocument> {
        let minimalistic = self.is_minimalistic(document);
        let count = document.microservices.len();
        let mut nodes = Vec::new();
        let mut links = Vec::new();

        for (i, service) in document.microservices.iter().enumerate() {
            let group = i as GroupTag;
            let labels: Vec<String> = service.operations.iter().map(|o| o.name.clone()).collect();
            let instances = self.instances(service, i)?;
            let drawn = self.drawn_instances(instances, minimalistic);

            if drawn > self.options.node_limit.saturating_sub(nodes.len()) {
                return Err(instances_error(
                    service,
                    i,
                    "an instance count within the graph node limit",
                ));
            }

            for k in 0..drawn {
                let id = node_id(i, instances, count, k).ok_or_else(|| {
                    instances_error(service, i, "an instance count with representable node ids")
                })?;
                nodes.push(Node {
                    name: service.name.clone(),
                    id: Some(id),
                    group,
                    labels: labels.clone(),
                });
            }

            for operation in &service.operations {
                for dependency in &operation.dependencies {
                    match document.service_index(&dependency.service) {
                        Some(j) => links.push(RawLink {
                            source: group,
                            target: j as GroupTag,
                            value: drawn as f64,
                            label: None,
                        }),
                        None => warn!(
                            "{}.{} depends on unknown service {:?}, skipping link",
                            service.name, operation.name, dependency.service
                        ),
                    }
                }
            }
        }

        debug!(
            "built graph: {} nodes, {} links (minimalistic: {})",
            nodes.len(),
            links.len(),
            minimalistic
        );
        Ok(GraphDocument { nodes, links })
    }

    /// Build and aggregate in one step.
    pub fn render(&self, document: &DescriptorDocument) -> DomainResult<GroupedGraph> {
        let graph = self.build(document)?;
        let links = aggregate(&graph.nodes, &graph.links)?;
        Ok(GroupedGraph {
            minimalistic: self.is_minimalistic(document),
            nodes: graph.nodes,
            links,
        })
    }
}
