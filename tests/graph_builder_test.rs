//! Tests for GraphBuilder

use pretty_assertions::assert_eq;
use rstest::rstest;

use archsim::domain::{
    Dependency, DomainError, DescriptorDocument, GraphBuilder, GraphOptions, Microservice, Operation, Simulation,
};

fn service(name: &str, instances: &str, operations: &[&str]) -> Microservice {
    Microservice {
        name: name.to_string(),
        instances: instances.to_string(),
        capacity: "100".to_string(),
        spatterns: vec![],
        operations: operations
            .iter()
            .map(|o| Operation {
                name: o.to_string(),
                demand: "10".to_string(),
                ..Operation::default()
            })
            .collect(),
    }
}

fn depend(service: &mut Microservice, operation: usize, target: &str) {
    service.operations[operation].dependencies.push(Dependency {
        service: target.to_string(),
        operation: "any".to_string(),
        probability: "1".to_string(),
    });
}

fn document(report: &str, microservices: Vec<Microservice>) -> DescriptorDocument {
    DescriptorDocument {
        simulation: Simulation {
            report: report.to_string(),
            ..Simulation::default()
        },
        microservices,
        ..DescriptorDocument::default()
    }
}

#[test]
fn given_services_when_building_then_one_node_per_instance_with_operation_labels() {
    // Arrange
    let doc = document(
        "full",
        vec![service("gateway", "2", &["route", "auth"]), service("db", "1", &["query"])],
    );
    let builder = GraphBuilder::default();

    // Act
    let graph = builder.build(&doc).unwrap();

    // Assert
    let summary: Vec<(&str, Option<i64>, i64)> = graph
        .nodes
        .iter()
        .map(|n| (n.name.as_str(), n.id, n.group))
        .collect();
    // id = i + instances + count * k
    assert_eq!(
        summary,
        vec![("gateway", Some(2), 0), ("gateway", Some(4), 0), ("db", Some(2), 1)]
    );
    assert_eq!(graph.nodes[0].labels, vec!["route", "auth"]);
}

#[test]
fn given_minimalistic_report_when_building_then_instances_capped() {
    // Arrange
    let doc = document("minimalistic", vec![service("worker", "25", &["work"])]);
    let builder = GraphBuilder::new(GraphOptions {
        instance_limit: 4,
        minimalistic_report: "minimalistic".to_string(),
        ..GraphOptions::default()
    });

    // Act
    let graph = builder.build(&doc).unwrap();

    // Assert
    assert!(builder.is_minimalistic(&doc));
    assert_eq!(graph.nodes.len(), 4);
}

#[test]
fn given_dependencies_when_building_then_raw_links_weighted_by_drawn_instances() {
    // Arrange
    let mut gateway = service("gateway", "3", &["route"]);
    depend(&mut gateway, 0, "db");
    let doc = document("full", vec![gateway, service("db", "1", &["query"])]);

    // Act
    let graph = GraphBuilder::default().build(&doc).unwrap();

    // Assert
    assert_eq!(graph.links.len(), 1);
    assert_eq!((graph.links[0].source, graph.links[0].target), (0, 1));
    assert_eq!(graph.links[0].value, 3.0);
}

#[test]
fn given_dangling_dependency_when_building_then_link_skipped() {
    // Arrange
    let mut gateway = service("gateway", "1", &["route"]);
    depend(&mut gateway, 0, "ghost");
    let doc = document("full", vec![gateway]);

    // Act
    let graph = GraphBuilder::default().build(&doc).unwrap();

    // Assert
    assert!(graph.links.is_empty());
}

#[test]
fn given_unparseable_instances_when_building_then_no_nodes_drawn() {
    // Arrange
    let doc = document("full", vec![service("gateway", "", &["route"])]);

    // Act
    let graph = GraphBuilder::default().build(&doc).unwrap();

    // Assert
    assert!(graph.nodes.is_empty());
}

#[test]
fn given_dependency_on_service_without_instances_when_rendering_then_unresolved_group() {
    // Arrange
    let mut gateway = service("gateway", "1", &["route"]);
    depend(&mut gateway, 0, "db");
    let doc = document("full", vec![gateway, service("db", "0", &["query"])]);

    // Act
    let result = GraphBuilder::default().render(&doc);

    // Assert
    assert!(result.is_err());
}

#[test]
fn given_descriptor_when_rendering_then_links_connect_instances() {
    // Arrange
    let mut gateway = service("gateway", "2", &["route", "auth"]);
    depend(&mut gateway, 0, "db");
    let doc = document("full", vec![gateway, service("db", "2", &["query"])]);

    // Act
    let graph = GraphBuilder::default().render(&doc).unwrap();

    // Assert
    assert!(!graph.minimalistic);
    let pairs: Vec<(usize, usize, Option<&str>)> = graph
        .links
        .iter()
        .map(|l| (l.source, l.target, l.label.as_deref()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            (0, 2, Some("route")),
            (0, 3, Some("auth")),
            (1, 2, Some("route")),
            (1, 3, Some("auth")),
        ]
    );
}

#[rstest]
#[case::below_limit("3", 3)]
#[case::at_limit("10", 10)]
#[case::above_limit("11", 10)]
#[case::zero("0", 0)]
fn given_minimalistic_report_when_building_then_drawn_instances_capped_at_limit(
    #[case] instances: &str,
    #[case] expected: usize,
) {
    // Arrange
    let doc = document("minimalistic", vec![service("worker", instances, &["work"])]);

    // Act
    let graph = GraphBuilder::default().build(&doc).unwrap();

    // Assert
    assert_eq!(graph.nodes.len(), expected);
}

#[test]
fn given_instance_count_beyond_node_ids_when_building_minimalistic_then_rejected() {
    // Arrange
    let doc = document(
        "minimalistic",
        vec![service("worker", "18446744073709551615", &["work"])],
    );

    // Act
    let result = GraphBuilder::default().build(&doc);

    // Assert
    match result {
        Err(DomainError::Validation { field, .. }) => {
            assert_eq!(field, "microservices.0.instances");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn given_instance_count_beyond_64_bits_when_building_then_rejected() {
    // Arrange
    let doc = document(
        "minimalistic",
        vec![service("worker", "99999999999999999999999", &["work"])],
    );

    // Act
    let result = GraphBuilder::default().build(&doc);

    // Assert
    assert!(result.unwrap_err().is_validation());
}

#[test]
fn given_instances_above_node_limit_when_building_full_report_then_rejected() {
    // Arrange
    let doc = document(
        "full",
        vec![service("a", "3", &["x"]), service("b", "3", &["y"])],
    );
    let builder = GraphBuilder::new(GraphOptions {
        node_limit: 5,
        ..GraphOptions::default()
    });

    // Act
    let result = builder.build(&doc);

    // Assert
    match result {
        Err(DomainError::Validation { field, .. }) => {
            assert_eq!(field, "microservices.1.instances");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn given_huge_instance_count_when_rendering_full_report_then_error_not_allocation() {
    // Arrange
    let doc = document("full", vec![service("worker", "18446744073709551615", &["work"])]);

    // Act
    let result = GraphBuilder::default().render(&doc);

    // Assert
    assert!(result.unwrap_err().is_validation());
}
