//! The descriptor document assembled from a descriptor tree.

use serde::{Deserialize, Serialize};

use crate::domain::entities::{Chaosmonkey, Generator, Microservice, Simulation};

/// Complete description of a simulated architecture.
///
/// JSON shape:
/// ```json
/// {
///   "simulation": {"experiment": "...", "model": "...", "duration": "...",
///                  "report": "...", "datapoints": "...", "seed": "..."},
///   "microservices": [{"name": "...", "instances": "...", "capacity": "...",
///                      "spatterns": [{"name": "Thread Pool", "arguments": [1.0]}],
///                      "operations": [{"name": "...", "demand": "...",
///                                      "opatterns": [...],
///                                      "dependencies": [{"service": "...", "operation": "...",
///                                                        "probability": "..."}]}]}],
///   "generators": [{"service": "...", "operation": "...", "time": "..."}],
///   "chaosmonkeys": [{"service": "...", "instances": "...", "time": "..."}]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DescriptorDocument {
    pub simulation: Simulation,
    pub microservices: Vec<Microservice>,
    pub generators: Vec<Generator>,
    pub chaosmonkeys: Vec<Chaosmonkey>,
}

impl DescriptorDocument {
    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Index of the first microservice called `name`.
    pub fn service_index(&self, name: &str) -> Option<usize> {
        self.microservices.iter().position(|s| s.name == name)
    }
}
