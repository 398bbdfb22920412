//! Descriptor tree: the nested, tail-only collections behind a descriptor document.
//!
//! Every sequence (services, operations, patterns, dependencies, generators,
//! chaosmonkeys) grows and shrinks only at its tail, so an entity's index is its
//! identity for as long as it lives. Sequence lengths are the lengths of the
//! owned vectors; there are no separate counters to drift.

use termtree::Tree;
use tracing::{debug, instrument, warn};

use crate::domain::document::DescriptorDocument;
use crate::domain::entities::{
    Chaosmonkey, Dependency, Generator, Microservice, Operation, OperationPattern,
    ServicePattern, Simulation,
};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::path::{
    ChaosmonkeyField, DependencyField, FieldPath, GeneratorField, MicroserviceField,
    OperationField, PatternField, PatternOwner, SimulationField,
};
use crate::domain::validation::parse_arguments;

/// Owns one architecture descriptor being edited.
///
/// Not shared between sessions; each editing session owns its own tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DescriptorTree {
    simulation: Simulation,
    microservices: Vec<Microservice>,
    generators: Vec<Generator>,
    chaosmonkeys: Vec<Chaosmonkey>,
}

fn pop_tail<T>(items: &mut Vec<T>, what: &str) -> DomainResult<usize> {
    if items.pop().is_none() {
        return Err(DomainError::precondition(format!(
            "cannot remove {}: sequence is empty",
            what
        )));
    }
    Ok(items.len())
}

impl DescriptorTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn microservices(&self) -> &[Microservice] {
        &self.microservices
    }

    pub fn generators(&self) -> &[Generator] {
        &self.generators
    }

    pub fn chaosmonkeys(&self) -> &[Chaosmonkey] {
        &self.chaosmonkeys
    }

    // ------------------------------------------------------------
    // Structural mutations (tail only)
    // ------------------------------------------------------------

    /// Append an empty microservice carrying one default operation.
    /// Returns the new service's index.
    #[instrument(level = "debug", skip(self))]
    pub fn append_microservice(&mut self) -> usize {
        self.microservices.push(Microservice::default());
        let index = self.microservices.len() - 1;
        debug!("appended microservice #{}", index);
        index
    }

    /// Remove the microservice with the highest index. Returns the removed index.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_microservice(&mut self) -> DomainResult<usize> {
        let index = pop_tail(&mut self.microservices, "microservice")?;
        debug!("removed microservice #{}", index);
        Ok(index)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn append_operation(&mut self, service: usize) -> DomainResult<usize> {
        let operations = &mut self.service_mut(service)?.operations;
        operations.push(Operation::default());
        let index = operations.len() - 1;
        debug!("appended operation #{} to microservice #{}", index, service);
        Ok(index)
    }

    /// Remove the tail operation of a service.
    ///
    /// The first operation is never removed: a microservice keeps at least one.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_operation(&mut self, service: usize) -> DomainResult<usize> {
        let operations = &mut self.service_mut(service)?.operations;
        if operations.len() <= 1 {
            return Err(DomainError::precondition(format!(
                "cannot remove the only operation of microservice #{}",
                service
            )));
        }
        let index = pop_tail(operations, "operation")?;
        debug!("removed operation #{} from microservice #{}", index, service);
        Ok(index)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn append_pattern(&mut self, owner: PatternOwner) -> DomainResult<usize> {
        let index = match owner {
            PatternOwner::Service(service) => {
                let patterns = &mut self.service_mut(service)?.spatterns;
                patterns.push(ServicePattern::default());
                patterns.len() - 1
            }
            PatternOwner::Operation { service, operation } => {
                let patterns = &mut self.operation_mut(service, operation)?.opatterns;
                patterns.push(OperationPattern::default());
                patterns.len() - 1
            }
        };
        debug!("appended pattern #{} to {:?}", index, owner);
        Ok(index)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn remove_pattern(&mut self, owner: PatternOwner) -> DomainResult<usize> {
        let index = match owner {
            PatternOwner::Service(service) => {
                pop_tail(&mut self.service_mut(service)?.spatterns, "service pattern")?
            }
            PatternOwner::Operation { service, operation } => pop_tail(
                &mut self.operation_mut(service, operation)?.opatterns,
                "operation pattern",
            )?,
        };
        debug!("removed pattern #{} from {:?}", index, owner);
        Ok(index)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn append_dependency(&mut self, service: usize, operation: usize) -> DomainResult<usize> {
        let dependencies = &mut self.operation_mut(service, operation)?.dependencies;
        dependencies.push(Dependency::default());
        Ok(dependencies.len() - 1)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn remove_dependency(&mut self, service: usize, operation: usize) -> DomainResult<usize> {
        pop_tail(
            &mut self.operation_mut(service, operation)?.dependencies,
            "dependency",
        )
    }

    #[instrument(level = "debug", skip(self))]
    pub fn append_generator(&mut self) -> usize {
        self.generators.push(Generator::default());
        self.generators.len() - 1
    }

    #[instrument(level = "debug", skip(self))]
    pub fn remove_generator(&mut self) -> DomainResult<usize> {
        pop_tail(&mut self.generators, "generator")
    }

    #[instrument(level = "debug", skip(self))]
    pub fn append_chaosmonkey(&mut self) -> usize {
        self.chaosmonkeys.push(Chaosmonkey::default());
        self.chaosmonkeys.len() - 1
    }

    #[instrument(level = "debug", skip(self))]
    pub fn remove_chaosmonkey(&mut self) -> DomainResult<usize> {
        pop_tail(&mut self.chaosmonkeys, "chaosmonkey")
    }

    // ------------------------------------------------------------
    // Field writes
    // ------------------------------------------------------------

    /// Set one scalar field.
    ///
    /// Fails with `Precondition` if the path addresses a non-live entity and with
    /// `Validation` if the value does not match the field's pattern; in both cases
    /// the tree is left unchanged. Accepted values are stored verbatim.
    #[instrument(level = "debug", skip(self))]
    pub fn set_field(&mut self, path: &FieldPath, value: &str) -> DomainResult<()> {
        let field = path.to_string();
        let kind = path.kind();

        match *path {
            FieldPath::ServicePattern {
                service,
                pattern,
                field: pattern_field,
            } => {
                let target = self
                    .service_mut(service)?
                    .spatterns
                    .get_mut(pattern)
                    .ok_or_else(|| not_live(&field))?;
                match pattern_field {
                    PatternField::Name => {
                        kind.check(&field, value).inspect_err(|_| rejected(&field, value))?;
                        target.name = value
                            .parse()
                            .map_err(|_| DomainError::validation(&field, value, kind.expected()))?;
                    }
                    PatternField::Arguments => {
                        target.arguments = parse_arguments(&field, value)
                            .inspect_err(|_| rejected(&field, value))?;
                    }
                }
            }
            FieldPath::OperationPattern {
                service,
                operation,
                pattern,
                field: pattern_field,
            } => {
                let target = self
                    .operation_mut(service, operation)?
                    .opatterns
                    .get_mut(pattern)
                    .ok_or_else(|| not_live(&field))?;
                match pattern_field {
                    PatternField::Name => {
                        kind.check(&field, value).inspect_err(|_| rejected(&field, value))?;
                        target.name = value
                            .parse()
                            .map_err(|_| DomainError::validation(&field, value, kind.expected()))?;
                    }
                    PatternField::Arguments => {
                        target.arguments = parse_arguments(&field, value)
                            .inspect_err(|_| rejected(&field, value))?;
                    }
                }
            }
            _ => {
                let slot = self.text_slot_mut(path)?;
                kind.check(&field, value).inspect_err(|_| rejected(&field, value))?;
                *slot = value.to_string();
            }
        }

        debug!("set {} = {:?}", field, value);
        Ok(())
    }

    /// Replace the simulation record as a whole. Every field is validated first;
    /// on any mismatch the previous record is kept.
    #[instrument(level = "debug", skip(self))]
    pub fn set_simulation(&mut self, simulation: Simulation) -> DomainResult<()> {
        let fields = [
            (SimulationField::Experiment, &simulation.experiment),
            (SimulationField::Model, &simulation.model),
            (SimulationField::Duration, &simulation.duration),
            (SimulationField::Report, &simulation.report),
            (SimulationField::Datapoints, &simulation.datapoints),
            (SimulationField::Seed, &simulation.seed),
        ];
        for (field, value) in fields {
            let name = FieldPath::Simulation(field).to_string();
            field
                .kind()
                .check(&name, value)
                .inspect_err(|_| rejected(&name, value))?;
        }
        self.simulation = simulation;
        Ok(())
    }

    // ------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------

    /// Assemble the descriptor document from the current state.
    pub fn snapshot(&self) -> DescriptorDocument {
        DescriptorDocument {
            simulation: self.simulation.clone(),
            microservices: self.microservices.clone(),
            generators: self.generators.clone(),
            chaosmonkeys: self.chaosmonkeys.clone(),
        }
    }

    /// Names of all live microservices, in index order.
    pub fn list_service_names(&self) -> Vec<String> {
        self.microservices.iter().map(|s| s.name.clone()).collect()
    }

    /// Operation names of the microservice(s) called `service_name`.
    ///
    /// A name matching no live service yields an empty list; the name may be
    /// stale while a rename is in progress.
    pub fn list_operation_names(&self, service_name: &str) -> Vec<String> {
        self.microservices
            .iter()
            .filter(|s| s.name == service_name)
            .flat_map(|s| s.operations.iter().map(|o| o.name.clone()))
            .collect()
    }

    /// Render the hierarchy for terminal display.
    pub fn render_tree(&self) -> Tree<String> {
        let sim = &self.simulation;
        let mut root = Tree::new(format!(
            "simulation {} (model {}, duration {}, report {}, datapoints {}, seed {})",
            display(&sim.experiment),
            display(&sim.model),
            display(&sim.duration),
            display(&sim.report),
            display(&sim.datapoints),
            display(&sim.seed),
        ));

        let mut services = Tree::new(format!("microservices [{}]", self.microservices.len()));
        for (i, service) in self.microservices.iter().enumerate() {
            let mut node = Tree::new(format!(
                "#{} {} (instances {}, capacity {})",
                i,
                display(&service.name),
                display(&service.instances),
                display(&service.capacity)
            ));
            for pattern in &service.spatterns {
                node.push(Tree::new(format!(
                    "pattern {} {:?}",
                    pattern.name, pattern.arguments
                )));
            }
            for (o, operation) in service.operations.iter().enumerate() {
                let mut op = Tree::new(format!(
                    "op #{} {} (demand {})",
                    o,
                    display(&operation.name),
                    display(&operation.demand)
                ));
                for pattern in &operation.opatterns {
                    op.push(Tree::new(format!(
                        "pattern {} {:?}",
                        pattern.name, pattern.arguments
                    )));
                }
                for dep in &operation.dependencies {
                    op.push(Tree::new(format!(
                        "-> {}.{} (p={})",
                        display(&dep.service),
                        display(&dep.operation),
                        display(&dep.probability)
                    )));
                }
                node.push(op);
            }
            services.push(node);
        }
        root.push(services);

        let mut generators = Tree::new(format!("generators [{}]", self.generators.len()));
        for (i, g) in self.generators.iter().enumerate() {
            generators.push(Tree::new(format!(
                "#{} {}.{} at {}",
                i,
                display(&g.service),
                display(&g.operation),
                display(&g.time)
            )));
        }
        root.push(generators);

        let mut monkeys = Tree::new(format!("chaosmonkeys [{}]", self.chaosmonkeys.len()));
        for (i, c) in self.chaosmonkeys.iter().enumerate() {
            monkeys.push(Tree::new(format!(
                "#{} {} kills {} at {}",
                i,
                display(&c.service),
                display(&c.instances),
                display(&c.time)
            )));
        }
        root.push(monkeys);

        root
    }

    // ------------------------------------------------------------
    // Lookup helpers
    // ------------------------------------------------------------

    fn service_mut(&mut self, service: usize) -> DomainResult<&mut Microservice> {
        let len = self.microservices.len();
        self.microservices.get_mut(service).ok_or_else(|| {
            DomainError::precondition(format!(
                "microservice #{} is not live ({} live)",
                service, len
            ))
        })
    }

    fn operation_mut(&mut self, service: usize, operation: usize) -> DomainResult<&mut Operation> {
        let operations = &mut self.service_mut(service)?.operations;
        let len = operations.len();
        operations.get_mut(operation).ok_or_else(|| {
            DomainError::precondition(format!(
                "operation #{} of microservice #{} is not live ({} live)",
                operation, service, len
            ))
        })
    }

    /// Locate the string slot behind a non-pattern field path.
    fn text_slot_mut(&mut self, path: &FieldPath) -> DomainResult<&mut String> {
        let slot = match *path {
            FieldPath::Simulation(field) => {
                let sim = &mut self.simulation;
                match field {
                    SimulationField::Experiment => &mut sim.experiment,
                    SimulationField::Model => &mut sim.model,
                    SimulationField::Duration => &mut sim.duration,
                    SimulationField::Report => &mut sim.report,
                    SimulationField::Datapoints => &mut sim.datapoints,
                    SimulationField::Seed => &mut sim.seed,
                }
            }
            FieldPath::Microservice { service, field } => {
                let target = self.service_mut(service)?;
                match field {
                    MicroserviceField::Name => &mut target.name,
                    MicroserviceField::Instances => &mut target.instances,
                    MicroserviceField::Capacity => &mut target.capacity,
                }
            }
            FieldPath::Operation {
                service,
                operation,
                field,
            } => {
                let target = self.operation_mut(service, operation)?;
                match field {
                    OperationField::Name => &mut target.name,
                    OperationField::Demand => &mut target.demand,
                }
            }
            FieldPath::Dependency {
                service,
                operation,
                dependency,
                field,
            } => {
                let target = self
                    .operation_mut(service, operation)?
                    .dependencies
                    .get_mut(dependency)
                    .ok_or_else(|| not_live(&path.to_string()))?;
                match field {
                    DependencyField::Service => &mut target.service,
                    DependencyField::Operation => &mut target.operation,
                    DependencyField::Probability => &mut target.probability,
                }
            }
            FieldPath::Generator { generator, field } => {
                let target = self
                    .generators
                    .get_mut(generator)
                    .ok_or_else(|| not_live(&path.to_string()))?;
                match field {
                    GeneratorField::Service => &mut target.service,
                    GeneratorField::Operation => &mut target.operation,
                    GeneratorField::Time => &mut target.time,
                }
            }
            FieldPath::Chaosmonkey { chaosmonkey, field } => {
                let target = self
                    .chaosmonkeys
                    .get_mut(chaosmonkey)
                    .ok_or_else(|| not_live(&path.to_string()))?;
                match field {
                    ChaosmonkeyField::Service => &mut target.service,
                    ChaosmonkeyField::Instances => &mut target.instances,
                    ChaosmonkeyField::Time => &mut target.time,
                }
            }
            FieldPath::ServicePattern { .. } | FieldPath::OperationPattern { .. } => {
                return Err(DomainError::InvalidPath(format!(
                    "{} is not a text field",
                    path
                )))
            }
        };
        Ok(slot)
    }
}

fn not_live(field: &str) -> DomainError {
    DomainError::precondition(format!("{} addresses an entity that is not live", field))
}

fn rejected(field: &str, value: &str) {
    warn!("rejected {} = {:?}, keeping previous value", field, value);
}

fn display(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}
