//! Group-level dependency graph aggregation.
//!
//! Input is a flat graph of per-instance nodes tagged with a group (one group per
//! service) and raw links between group tags. Output links connect every node of
//! a source group with every node of each group it links to, labelled from the
//! source node's labels in cyclic order.
//!
//! Aggregation is a pure function of its inputs and is deterministic: the same
//! nodes and links always produce the same links in the same order.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};

/// Integer classifying a node; instances of one service share a group.
pub type GroupTag = i64;

/// One drawable node, typically a service instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub group: GroupTag,
    #[serde(default)]
    pub labels: Vec<String>,
}

/// Link between two group tags, as produced by the dependency export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLink {
    pub source: GroupTag,
    pub target: GroupTag,
    #[serde(default)]
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Link between two concrete nodes, addressed by their index in the node list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedLink {
    pub source: usize,
    pub target: usize,
    pub label: Option<String>,
}

impl GroupedLink {
    pub fn source_node<'a>(&self, nodes: &'a [Node]) -> Option<&'a Node> {
        nodes.get(self.source)
    }

    pub fn target_node<'a>(&self, nodes: &'a [Node]) -> Option<&'a Node> {
        nodes.get(self.target)
    }
}

/// Raw graph document: `{nodes: [...], links: [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub links: Vec<RawLink>,
}

/// Drawable graph document with node-to-node links.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupedGraph {
    /// Instance counts were capped when the graph was built.
    #[serde(default)]
    pub minimalistic: bool,
    pub nodes: Vec<Node>,
    pub links: Vec<GroupedLink>,
}

impl GraphDocument {
    /// Aggregate this document's raw links into a drawable graph.
    pub fn aggregate(&self) -> DomainResult<GroupedGraph> {
        Ok(GroupedGraph {
            minimalistic: false,
            nodes: self.nodes.clone(),
            links: aggregate(&self.nodes, &self.links)?,
        })
    }
}

/// Stage 1: resolve each raw link endpoint to the first node carrying its group.
///
/// Every endpoint must be carried by at least one node, otherwise the whole call
/// fails with `UnresolvedGroup`.
pub fn regroup(nodes: &[Node], raw_links: &[RawLink]) -> DomainResult<Vec<RawLink>> {
    let first_of = |group: GroupTag| {
        nodes
            .iter()
            .find(|n| n.group == group)
            .ok_or(DomainError::UnresolvedGroup(group))
    };

    raw_links
        .iter()
        .map(|link| -> DomainResult<RawLink> {
            let source = first_of(link.source)?;
            let target = first_of(link.target)?;
            Ok(RawLink {
                source: source.group,
                target: target.group,
                value: link.value,
                label: link.label.clone(),
            })
        })
        .collect()
}

/// Cursor over a node's labels that restarts from the first label once exhausted,
/// so a node with few labels still labels every outgoing link.
///
/// The cursor resets only past the end of the list. An empty-string label is an
/// entry like any other: it is emitted as `Some("")` and does not reset the cursor.
struct LabelCycle<'a> {
    labels: &'a [String],
    cursor: usize,
}

impl<'a> LabelCycle<'a> {
    fn new(labels: &'a [String]) -> Self {
        Self { labels, cursor: 0 }
    }

    fn next_label(&mut self) -> Option<String> {
        if self.cursor >= self.labels.len() {
            self.cursor = 0;
        }
        let label = self.labels.get(self.cursor).cloned();
        self.cursor += 1;
        label
    }
}

/// Expand group-to-group links into node-to-node links.
///
/// Groups are visited in the order they first appear as a link source; within a
/// group, links are emitted in `source nodes x target nodes` order, both in
/// original node order. A group's target set is deduplicated.
#[instrument(level = "debug", skip_all, fields(nodes = nodes.len(), links = raw_links.len()))]
pub fn aggregate(nodes: &[Node], raw_links: &[RawLink]) -> DomainResult<Vec<GroupedLink>> {
    let regrouped = regroup(nodes, raw_links)?;

    let mut targets: IndexMap<GroupTag, IndexSet<GroupTag>> = IndexMap::new();
    for link in &regrouped {
        targets.entry(link.source).or_default().insert(link.target);
    }

    let mut links = Vec::new();
    for (group, target_groups) in &targets {
        let target_nodes: Vec<usize> = nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| target_groups.contains(&n.group))
            .map(|(i, _)| i)
            .collect();

        for (s, source) in nodes.iter().enumerate().filter(|(_, n)| n.group == *group) {
            let mut labels = LabelCycle::new(&source.labels);
            for &t in &target_nodes {
                links.push(GroupedLink {
                    source: s,
                    target: t,
                    label: labels.next_label(),
                });
            }
        }
    }

    debug!(
        "aggregated {} raw links over {} groups into {} links",
        raw_links.len(),
        targets.len(),
        links.len()
    );
    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, group: GroupTag, labels: &[&str]) -> Node {
        Node {
            name: name.to_string(),
            id: None,
            group,
            labels: labels.iter().map(|l| l.to_string()).collect(),
        }
    }

    #[test]
    fn test_label_cycle_restarts() {
        let labels = vec!["a".to_string(), "b".to_string()];
        let mut cycle = LabelCycle::new(&labels);
        let got: Vec<_> = (0..5).map(|_| cycle.next_label()).collect();
        assert_eq!(
            got,
            vec![
                Some("a".into()),
                Some("b".into()),
                Some("a".into()),
                Some("b".into()),
                Some("a".into())
            ]
        );
    }

    #[test]
    fn test_label_cycle_empty_yields_none() {
        let mut cycle = LabelCycle::new(&[]);
        assert_eq!(cycle.next_label(), None);
        assert_eq!(cycle.next_label(), None);
    }

    #[test]
    fn test_regroup_keeps_weight_and_label() {
        let nodes = vec![node("B", 0, &["b1"]), node("A", 1, &["a1"])];
        let raw = vec![RawLink {
            source: 0,
            target: 1,
            value: 2.0,
            label: Some("x".into()),
        }];
        let regrouped = regroup(&nodes, &raw).unwrap();
        assert_eq!(regrouped, raw);
    }

    #[test]
    fn test_duplicate_target_groups_are_collapsed() {
        let nodes = vec![node("B", 0, &["b1"]), node("A", 1, &["a1"])];
        let link = RawLink {
            source: 0,
            target: 1,
            value: 1.0,
            label: None,
        };
        let links = aggregate(&nodes, &[link.clone(), link]).unwrap();
        assert_eq!(links.len(), 1);
    }
}
