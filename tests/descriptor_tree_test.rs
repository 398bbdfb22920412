//! Tests for DescriptorTree

use pretty_assertions::assert_eq;
use rstest::rstest;

use archsim::domain::{
    DescriptorDocument, DescriptorTree, DomainError, FieldPath, PatternOwner, Simulation,
};

fn path(text: &str) -> FieldPath {
    text.parse().expect("field path")
}

fn named_service(tree: &mut DescriptorTree, name: &str) -> usize {
    let index = tree.append_microservice();
    tree.set_field(&path(&format!("microservices.{}.name", index)), name)
        .expect("set name");
    index
}

#[rstest]
#[case::appends_only(3, 0, 3)]
#[case::balanced(2, 2, 0)]
#[case::more_removes_than_appends(1, 4, 0)]
fn given_append_remove_sequence_when_applied_then_length_is_difference_never_negative(
    #[case] appends: usize,
    #[case] removes: usize,
    #[case] expected: usize,
) {
    // Arrange
    let mut tree = DescriptorTree::new();

    // Act
    for _ in 0..appends {
        tree.append_generator();
        tree.append_microservice();
    }
    let mut failed = 0;
    for _ in 0..removes {
        if tree.remove_generator().is_err() {
            failed += 1;
        }
        let _ = tree.remove_microservice();
    }

    // Assert
    assert_eq!(tree.generators().len(), expected);
    assert_eq!(tree.microservices().len(), expected);
    assert_eq!(failed, removes.saturating_sub(appends));
}

#[test]
fn given_empty_tree_when_removing_then_precondition_violation() {
    // Arrange
    let mut tree = DescriptorTree::new();

    // Act
    let result = tree.remove_chaosmonkey();

    // Assert
    assert!(matches!(result, Err(DomainError::Precondition(_))));
    assert!(tree.chaosmonkeys().is_empty());
}

#[test]
fn given_unchanged_tree_when_snapshotting_twice_then_documents_are_equal() {
    // Arrange
    let mut tree = DescriptorTree::new();
    named_service(&mut tree, "frontend");
    tree.append_dependency(0, 0).unwrap();
    tree.append_chaosmonkey();

    // Act
    let first = tree.snapshot();
    let second = tree.snapshot();

    // Assert
    assert_eq!(first, second);
}

#[test]
fn given_new_microservice_when_appending_operation_then_two_operations() {
    // Arrange
    let mut tree = DescriptorTree::new();
    let service = tree.append_microservice();

    // Act
    let operation = tree.append_operation(service).unwrap();
    let document = tree.snapshot();

    // Assert
    assert_eq!(operation, 1);
    assert_eq!(document.microservices[0].operations.len(), 2);
}

#[rstest]
#[case("abc def", false)]
#[case("svc-1", true)]
#[case("", false)]
fn given_name_field_when_setting_then_validated(#[case] value: &str, #[case] accepted: bool) {
    // Arrange
    let mut tree = DescriptorTree::new();
    tree.append_microservice();

    // Act
    let result = tree.set_field(&path("microservices.0.name"), value);

    // Assert
    assert_eq!(result.is_ok(), accepted);
    if !accepted {
        assert!(result.unwrap_err().is_validation());
        assert_eq!(tree.microservices()[0].name, "");
    }
}

#[test]
fn given_unknown_service_name_when_listing_operations_then_empty() {
    // Arrange
    let mut tree = DescriptorTree::new();
    named_service(&mut tree, "frontend");

    // Act
    let names = tree.list_operation_names("ghost");

    // Assert
    assert!(names.is_empty());
}

#[test]
fn given_named_operations_when_listing_then_in_index_order() {
    // Arrange
    let mut tree = DescriptorTree::new();
    named_service(&mut tree, "frontend");
    named_service(&mut tree, "backend");
    tree.append_operation(1).unwrap();
    tree.set_field(&path("microservices.1.operations.0.name"), "read")
        .unwrap();
    tree.set_field(&path("microservices.1.operations.1.name"), "write")
        .unwrap();

    // Act
    let services = tree.list_service_names();
    let operations = tree.list_operation_names("backend");

    // Assert
    assert_eq!(services, vec!["frontend", "backend"]);
    assert_eq!(operations, vec!["read", "write"]);
}

#[test]
fn given_non_live_parent_when_appending_then_precondition_violation() {
    // Arrange
    let mut tree = DescriptorTree::new();
    tree.append_microservice();

    // Act & Assert
    assert!(matches!(
        tree.append_operation(1),
        Err(DomainError::Precondition(_))
    ));
    assert!(matches!(
        tree.append_dependency(0, 3),
        Err(DomainError::Precondition(_))
    ));
    assert!(matches!(
        tree.append_pattern(PatternOwner::Operation {
            service: 0,
            operation: 1
        }),
        Err(DomainError::Precondition(_))
    ));
}

#[test]
fn given_non_live_entity_when_setting_field_then_precondition_before_validation() {
    // Arrange
    let mut tree = DescriptorTree::new();

    // Act
    let result = tree.set_field(&path("generators.0.time"), "not a number");

    // Assert
    assert!(matches!(result, Err(DomainError::Precondition(_))));
}

#[test]
fn given_dependency_when_setting_probability_then_bounded_to_unit_interval() {
    // Arrange
    let mut tree = DescriptorTree::new();
    tree.append_microservice();
    tree.append_dependency(0, 0).unwrap();
    let probability = path("microservices.0.operations.0.dependencies.0.probability");

    // Act
    let accepted = tree.set_field(&probability, "0.5");
    let rejected = tree.set_field(&probability, "1.5");

    // Assert
    assert!(accepted.is_ok());
    assert!(rejected.unwrap_err().is_validation());
    assert_eq!(
        tree.microservices()[0].operations[0].dependencies[0].probability,
        "0.5"
    );
}

#[test]
fn given_service_pattern_when_setting_name_and_arguments_then_parsed() {
    // Arrange
    let mut tree = DescriptorTree::new();
    tree.append_microservice();
    tree.append_pattern(PatternOwner::Service(0)).unwrap();

    // Act
    tree.set_field(&path("microservices.0.spatterns.0.name"), "ThreadQueue")
        .unwrap();
    tree.set_field(&path("microservices.0.spatterns.0.arguments"), ",4,2.5,")
        .unwrap();
    let bad_kind = tree.set_field(&path("microservices.0.spatterns.0.name"), "Circuit Breaker");

    // Assert
    let pattern = &tree.microservices()[0].spatterns[0];
    assert_eq!(pattern.name.to_string(), "Thread Queue");
    assert_eq!(pattern.arguments, vec![4.0, 2.5]);
    assert!(bad_kind.unwrap_err().is_validation());
}

#[test]
fn given_invalid_simulation_when_replacing_then_previous_record_kept() {
    // Arrange
    let mut tree = DescriptorTree::new();
    let valid = Simulation {
        experiment: "exp1".into(),
        model: "model".into(),
        duration: "120.5".into(),
        report: "minimalistic".into(),
        datapoints: "100".into(),
        seed: "42".into(),
    };
    tree.set_simulation(valid.clone()).unwrap();
    let invalid = Simulation {
        seed: "forty-two".into(),
        ..valid.clone()
    };

    // Act
    let result = tree.set_simulation(invalid);

    // Assert
    assert!(result.unwrap_err().is_validation());
    assert_eq!(tree.simulation(), &valid);
}

#[test]
fn given_single_operation_when_removing_it_then_refused() {
    // Arrange
    let mut tree = DescriptorTree::new();
    tree.append_microservice();
    tree.append_operation(0).unwrap();

    // Act
    let first = tree.remove_operation(0);
    let second = tree.remove_operation(0);

    // Assert
    assert_eq!(first, Ok(1));
    assert!(matches!(second, Err(DomainError::Precondition(_))));
    assert_eq!(tree.microservices()[0].operations.len(), 1);
}

#[test]
fn given_argument_overflowing_f64_when_setting_then_rejected_and_snapshot_reloads() {
    // Arrange
    let mut tree = DescriptorTree::new();
    tree.append_microservice();
    tree.append_pattern(PatternOwner::Service(0)).unwrap();
    let arguments = path("microservices.0.spatterns.0.arguments");
    tree.set_field(&arguments, "4").unwrap();

    // Act
    let result = tree.set_field(&arguments, &format!("1{}", "0".repeat(400)));

    // Assert
    assert!(result.unwrap_err().is_validation());
    assert_eq!(tree.microservices()[0].spatterns[0].arguments, vec![4.0]);
    let json = tree.snapshot().to_json(false).unwrap();
    let reloaded = DescriptorDocument::from_json(&json).unwrap();
    assert_eq!(reloaded, tree.snapshot());
}
