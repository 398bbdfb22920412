//! Domain entities: core data structures of an architecture descriptor
//!
//! Scalar fields are kept as the text the user entered; numeric coercion is left
//! to consumers of the descriptor document. Cross-entity relations
//! (dependency, generator, chaosmonkey targets) are weak references by name.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Experiment-wide settings. Exactly one exists per descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Simulation {
    pub experiment: String,
    pub model: String,
    pub duration: String,
    pub report: String,
    pub datapoints: String,
    pub seed: String,
}

/// A simulated service with its resilience patterns and operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Microservice {
    pub name: String,
    pub instances: String,
    pub capacity: String,
    #[serde(default)]
    pub spatterns: Vec<ServicePattern>,
    #[serde(default)]
    pub operations: Vec<Operation>,
}

impl Default for Microservice {
    /// A fresh service always owns one default operation.
    fn default() -> Self {
        Self {
            name: String::new(),
            instances: String::new(),
            capacity: String::new(),
            spatterns: Vec::new(),
            operations: vec![Operation::default()],
        }
    }
}

/// Service-level resilience pattern.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServicePattern {
    pub name: ServicePatternKind,
    #[serde(default)]
    pub arguments: Vec<f64>,
}

/// Closed set of service-level pattern kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServicePatternKind {
    #[default]
    #[serde(rename = "Thread Pool", alias = "ThreadPool")]
    ThreadPool,
    #[serde(rename = "Thread Queue", alias = "ThreadQueue")]
    ThreadQueue,
}

/// An operation exposed by a microservice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub name: String,
    pub demand: String,
    #[serde(default)]
    pub opatterns: Vec<OperationPattern>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

/// Operation-level resilience pattern.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationPattern {
    pub name: OperationPatternKind,
    #[serde(default)]
    pub arguments: Vec<f64>,
}

/// Closed set of operation-level pattern kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationPatternKind {
    #[default]
    #[serde(rename = "Circuit Breaker", alias = "CircuitBreaker")]
    CircuitBreaker,
    #[serde(rename = "Performance Breaker", alias = "PerformanceBreaker")]
    PerformanceBreaker,
}

/// Call from an operation into another service's operation, by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub service: String,
    pub operation: String,
    pub probability: String,
}

/// Load generator firing requests at one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generator {
    pub service: String,
    pub operation: String,
    pub time: String,
}

/// Fault injection killing instances of a service at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chaosmonkey {
    pub service: String,
    pub instances: String,
    pub time: String,
}

/// Error parsing a pattern kind from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternKindParseError {
    pub value: String,
}

impl fmt::Display for PatternKindParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown pattern kind: {}", self.value)
    }
}

impl std::error::Error for PatternKindParseError {}

impl ServicePatternKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ServicePatternKind::ThreadPool => "Thread Pool",
            ServicePatternKind::ThreadQueue => "Thread Queue",
        }
    }
}

impl fmt::Display for ServicePatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServicePatternKind {
    type Err = PatternKindParseError;

    /// Accepts the display spelling and the compact one.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Thread Pool" | "ThreadPool" => Ok(ServicePatternKind::ThreadPool),
            "Thread Queue" | "ThreadQueue" => Ok(ServicePatternKind::ThreadQueue),
            _ => Err(PatternKindParseError {
                value: s.to_string(),
            }),
        }
    }
}

impl OperationPatternKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OperationPatternKind::CircuitBreaker => "Circuit Breaker",
            OperationPatternKind::PerformanceBreaker => "Performance Breaker",
        }
    }
}

impl fmt::Display for OperationPatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationPatternKind {
    type Err = PatternKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Circuit Breaker" | "CircuitBreaker" => Ok(OperationPatternKind::CircuitBreaker),
            "Performance Breaker" | "PerformanceBreaker" => {
                Ok(OperationPatternKind::PerformanceBreaker)
            }
            _ => Err(PatternKindParseError {
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_microservice_has_one_operation() {
        let service = Microservice::default();
        assert_eq!(service.operations.len(), 1);
        assert!(service.spatterns.is_empty());
    }

    #[test]
    fn test_pattern_kinds_accept_both_spellings() {
        assert_eq!(
            "ThreadQueue".parse::<ServicePatternKind>().unwrap(),
            ServicePatternKind::ThreadQueue
        );
        assert_eq!(
            "Performance Breaker".parse::<OperationPatternKind>().unwrap(),
            OperationPatternKind::PerformanceBreaker
        );
        assert!("Bulkhead".parse::<ServicePatternKind>().is_err());
        assert!("Thread Pool".parse::<OperationPatternKind>().is_err());
    }
}
