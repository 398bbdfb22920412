//! Field addressing inside a descriptor tree.
//!
//! A [`FieldPath`] names one scalar field of one entity by its full index path.
//! The textual form mirrors the document keys, e.g.
//! `microservices.0.operations.1.dependencies.0.probability`.

use std::fmt;
use std::str::FromStr;

use crate::domain::error::DomainError;
use crate::domain::validation::FieldKind;

macro_rules! field_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $key:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Document key of this field.
            pub fn key(self) -> &'static str {
                match self {
                    $($name::$variant => $key),+
                }
            }

            pub fn from_key(key: &str) -> Option<Self> {
                match key {
                    $($key => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.key())
            }
        }
    };
}

field_enum!(
    /// Fields of the simulation record.
    SimulationField {
        Experiment => "experiment",
        Model => "model",
        Duration => "duration",
        Report => "report",
        Datapoints => "datapoints",
        Seed => "seed",
    }
);

field_enum!(
    MicroserviceField {
        Name => "name",
        Instances => "instances",
        Capacity => "capacity",
    }
);

field_enum!(
    /// Fields shared by service and operation patterns.
    PatternField {
        Name => "name",
        Arguments => "arguments",
    }
);

field_enum!(
    OperationField {
        Name => "name",
        Demand => "demand",
    }
);

field_enum!(
    DependencyField {
        Service => "service",
        Operation => "operation",
        Probability => "probability",
    }
);

field_enum!(
    GeneratorField {
        Service => "service",
        Operation => "operation",
        Time => "time",
    }
);

field_enum!(
    ChaosmonkeyField {
        Service => "service",
        Instances => "instances",
        Time => "time",
    }
);

impl SimulationField {
    pub fn kind(self) -> FieldKind {
        match self {
            SimulationField::Experiment | SimulationField::Model | SimulationField::Report => {
                FieldKind::Name
            }
            SimulationField::Duration => FieldKind::Real,
            SimulationField::Datapoints | SimulationField::Seed => FieldKind::Integer,
        }
    }
}

/// Owner of a pattern sequence: a service, or one operation of a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternOwner {
    Service(usize),
    Operation { service: usize, operation: usize },
}

impl PatternOwner {
    /// Service-level owner when `operation` is `None`, operation-level otherwise.
    pub fn new(service: usize, operation: Option<usize>) -> Self {
        match operation {
            Some(operation) => PatternOwner::Operation { service, operation },
            None => PatternOwner::Service(service),
        }
    }
}

/// Full address of one scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldPath {
    Simulation(SimulationField),
    Microservice {
        service: usize,
        field: MicroserviceField,
    },
    ServicePattern {
        service: usize,
        pattern: usize,
        field: PatternField,
    },
    Operation {
        service: usize,
        operation: usize,
        field: OperationField,
    },
    OperationPattern {
        service: usize,
        operation: usize,
        pattern: usize,
        field: PatternField,
    },
    Dependency {
        service: usize,
        operation: usize,
        dependency: usize,
        field: DependencyField,
    },
    Generator {
        generator: usize,
        field: GeneratorField,
    },
    Chaosmonkey {
        chaosmonkey: usize,
        field: ChaosmonkeyField,
    },
}

impl FieldPath {
    /// The value pattern this field requires.
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldPath::Simulation(field) => field.kind(),
            FieldPath::Microservice { field, .. } => match field {
                MicroserviceField::Name => FieldKind::Name,
                MicroserviceField::Instances | MicroserviceField::Capacity => FieldKind::Integer,
            },
            FieldPath::ServicePattern { field, .. } => match field {
                PatternField::Name => FieldKind::ServicePatternKind,
                PatternField::Arguments => FieldKind::Arguments,
            },
            FieldPath::Operation { field, .. } => match field {
                OperationField::Name => FieldKind::Name,
                OperationField::Demand => FieldKind::Integer,
            },
            FieldPath::OperationPattern { field, .. } => match field {
                PatternField::Name => FieldKind::OperationPatternKind,
                PatternField::Arguments => FieldKind::Arguments,
            },
            FieldPath::Dependency { field, .. } => match field {
                DependencyField::Service | DependencyField::Operation => FieldKind::Name,
                DependencyField::Probability => FieldKind::Probability,
            },
            FieldPath::Generator { field, .. } => match field {
                GeneratorField::Service | GeneratorField::Operation => FieldKind::Name,
                GeneratorField::Time => FieldKind::Real,
            },
            FieldPath::Chaosmonkey { field, .. } => match field {
                ChaosmonkeyField::Service => FieldKind::Name,
                ChaosmonkeyField::Instances => FieldKind::Integer,
                ChaosmonkeyField::Time => FieldKind::Real,
            },
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPath::Simulation(field) => write!(f, "simulation.{}", field),
            FieldPath::Microservice { service, field } => {
                write!(f, "microservices.{}.{}", service, field)
            }
            FieldPath::ServicePattern {
                service,
                pattern,
                field,
            } => write!(f, "microservices.{}.spatterns.{}.{}", service, pattern, field),
            FieldPath::Operation {
                service,
                operation,
                field,
            } => write!(
                f,
                "microservices.{}.operations.{}.{}",
                service, operation, field
            ),
            FieldPath::OperationPattern {
                service,
                operation,
                pattern,
                field,
            } => write!(
                f,
                "microservices.{}.operations.{}.opatterns.{}.{}",
                service, operation, pattern, field
            ),
            FieldPath::Dependency {
                service,
                operation,
                dependency,
                field,
            } => write!(
                f,
                "microservices.{}.operations.{}.dependencies.{}.{}",
                service, operation, dependency, field
            ),
            FieldPath::Generator { generator, field } => {
                write!(f, "generators.{}.{}", generator, field)
            }
            FieldPath::Chaosmonkey { chaosmonkey, field } => {
                write!(f, "chaosmonkeys.{}.{}", chaosmonkey, field)
            }
        }
    }
}

fn index(path: &str, segment: &str) -> Result<usize, DomainError> {
    segment
        .parse::<usize>()
        .map_err(|_| DomainError::InvalidPath(format!("{}: bad index {:?}", path, segment)))
}

fn field<F>(path: &str, key: &str, lookup: impl Fn(&str) -> Option<F>) -> Result<F, DomainError> {
    lookup(key).ok_or_else(|| DomainError::InvalidPath(format!("{}: unknown field {:?}", path, key)))
}

impl FromStr for FieldPath {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = s.trim().split('.').collect();
        let path = match segments.as_slice() {
            ["simulation", f] => {
                FieldPath::Simulation(field(s, f, SimulationField::from_key)?)
            }
            ["microservices", i, f] => FieldPath::Microservice {
                service: index(s, i)?,
                field: field(s, f, MicroserviceField::from_key)?,
            },
            ["microservices", i, "spatterns", p, f] => FieldPath::ServicePattern {
                service: index(s, i)?,
                pattern: index(s, p)?,
                field: field(s, f, PatternField::from_key)?,
            },
            ["microservices", i, "operations", o, f] => FieldPath::Operation {
                service: index(s, i)?,
                operation: index(s, o)?,
                field: field(s, f, OperationField::from_key)?,
            },
            ["microservices", i, "operations", o, "opatterns", p, f] => {
                FieldPath::OperationPattern {
                    service: index(s, i)?,
                    operation: index(s, o)?,
                    pattern: index(s, p)?,
                    field: field(s, f, PatternField::from_key)?,
                }
            }
            ["microservices", i, "operations", o, "dependencies", d, f] => FieldPath::Dependency {
                service: index(s, i)?,
                operation: index(s, o)?,
                dependency: index(s, d)?,
                field: field(s, f, DependencyField::from_key)?,
            },
            ["generators", g, f] => FieldPath::Generator {
                generator: index(s, g)?,
                field: field(s, f, GeneratorField::from_key)?,
            },
            ["chaosmonkeys", c, f] => FieldPath::Chaosmonkey {
                chaosmonkey: index(s, c)?,
                field: field(s, f, ChaosmonkeyField::from_key)?,
            },
            _ => return Err(DomainError::InvalidPath(s.to_string())),
        };
        Ok(path)
    }
}
