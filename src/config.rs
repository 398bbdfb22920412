//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/archsim/archsim.toml`
//! 3. Local config: `<project_dir>/.archsim.toml`
//! 4. Environment variables: `ARCHSIM_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::GraphOptions;

/// Dependency graph settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GraphSettings {
    /// Maximum drawn instances per service in minimalistic reports
    pub instance_limit: usize,
    /// Simulation report name that activates the instance cap
    pub minimalistic_report: String,
    /// Maximum nodes in one graph
    pub node_limit: usize,
}

impl Default for GraphSettings {
    fn default() -> Self {
        let options = GraphOptions::default();
        Self {
            instance_limit: options.instance_limit,
            minimalistic_report: options.minimalistic_report,
            node_limit: options.node_limit,
        }
    }
}

impl GraphSettings {
    pub fn to_options(&self) -> GraphOptions {
        GraphOptions {
            instance_limit: self.instance_limit,
            minimalistic_report: self.minimalistic_report.clone(),
            node_limit: self.node_limit,
        }
    }

    fn merge(&self, overlay: &RawGraphSettings) -> Self {
        Self {
            instance_limit: overlay.instance_limit.unwrap_or(self.instance_limit),
            minimalistic_report: overlay
                .minimalistic_report
                .clone()
                .unwrap_or_else(|| self.minimalistic_report.clone()),
            node_limit: overlay.node_limit.unwrap_or(self.node_limit),
        }
    }
}

/// Raw graph settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawGraphSettings {
    pub instance_limit: Option<usize>,
    pub minimalistic_report: Option<String>,
    pub node_limit: Option<usize>,
}

/// Raw settings for intermediate parsing.
///
/// `None` means the layer does not specify the field and the base value is kept.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub pretty: Option<bool>,
    pub strict: Option<bool>,
    pub graph: RawGraphSettings,
}

/// Unified configuration for archsim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Pretty-print emitted JSON documents
    pub pretty: bool,
    /// Abort script replay on the first rejected field write
    pub strict: bool,
    pub graph: GraphSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pretty: true,
            strict: false,
            graph: GraphSettings::default(),
        }
    }
}

/// Get the XDG config directory for archsim.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "archsim").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("archsim.toml"))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".archsim.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    parse_raw_settings(&content).map_err(|message| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), message),
    })
}

fn parse_raw_settings(content: &str) -> Result<RawSettings, String> {
    toml::from_str(content).map_err(|e| e.to_string())
}

impl Settings {
    /// Merge overlay config onto self (base): overlay wins where it is `Some`.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            pretty: overlay.pretty.unwrap_or(self.pretty),
            strict: overlay.strict.unwrap_or(self.strict),
            graph: self.graph.merge(&overlay.graph),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional project directory for local config
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(dir) = project_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        Self::apply_env_overrides(current)
    }

    /// Apply ARCHSIM_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("ARCHSIM").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_bool("pretty") {
            settings.pretty = val;
        }
        if let Ok(val) = config.get_bool("strict") {
            settings.strict = val;
        }
        if let Ok(val) = config.get_int("graph.instance_limit") {
            settings.graph.instance_limit = usize::try_from(val).map_err(|_| {
                ApplicationError::Config {
                    message: format!("graph.instance_limit must not be negative: {val}"),
                }
            })?;
        }
        if let Ok(val) = config.get_int("graph.node_limit") {
            settings.graph.node_limit = usize::try_from(val).map_err(|_| {
                ApplicationError::Config {
                    message: format!("graph.node_limit must not be negative: {val}"),
                }
            })?;
        }
        if let Ok(val) = config.get_string("graph.minimalistic_report") {
            settings.graph.minimalistic_report = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
