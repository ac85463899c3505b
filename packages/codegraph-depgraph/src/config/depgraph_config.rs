//! Dependency-graph configuration (YAML schema v1)

use super::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Schema versions this crate can read
pub const SUPPORTED_VERSIONS: &[u32] = &[1];

const MAX_THREADS: usize = 1024;

/// Node builder settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct BuilderConfig {
    /// Build nodes for external (non-source) class files: public surface only,
    /// no usages, private members stripped
    pub library_mode: bool,

    /// Annotation classes whose argument content is hashed
    /// (binary names, e.g. `org/jetbrains/annotations/NotNull`)
    pub tracked_annotations: Vec<String>,

    /// Hash the content of every annotation regardless of `tracked_annotations`
    pub track_all_annotations: bool,
}

/// Parallel batch build settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ParallelConfig {
    /// Worker threads (0 = number of CPUs)
    pub num_threads: usize,
}

impl ParallelConfig {
    /// Resolved worker count
    pub fn effective_threads(&self) -> usize {
        if self.num_threads == 0 {
            num_cpus::get()
        } else {
            self.num_threads
        }
    }
}

/// Top-level configuration document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DepGraphConfig {
    /// Schema version (always 1 for v1)
    pub version: u32,

    #[serde(default)]
    pub builder: BuilderConfig,

    #[serde(default)]
    pub parallel: ParallelConfig,
}

impl Default for DepGraphConfig {
    fn default() -> Self {
        Self {
            version: 1,
            builder: BuilderConfig::default(),
            parallel: ParallelConfig::default(),
        }
    }
}

/// Raw document used to report a missing `version` before strict parsing
#[derive(Deserialize)]
struct VersionProbe {
    version: Option<u32>,
}

impl DepGraphConfig {
    /// Load from a YAML file
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load from YAML text
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let probe: VersionProbe = serde_yaml::from_str(content)?;
        match probe.version {
            None => return Err(ConfigError::MissingVersion),
            Some(found) if !SUPPORTED_VERSIONS.contains(&found) => {
                return Err(ConfigError::UnsupportedVersion {
                    found,
                    supported: SUPPORTED_VERSIONS.to_vec(),
                })
            }
            Some(_) => {}
        }

        let config: DepGraphConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> ConfigResult<String> {
        serde_yaml::to_string(self).map_err(ConfigError::Yaml)
    }

    /// Range and format checks
    pub fn validate(&self) -> ConfigResult<()> {
        if self.parallel.num_threads > MAX_THREADS {
            return Err(ConfigError::range(
                "parallel.num_threads",
                self.parallel.num_threads,
                0,
                MAX_THREADS,
            ));
        }

        for name in &self.builder.tracked_annotations {
            let is_descriptor = name.starts_with('L') && name.ends_with(';');
            if name.is_empty() || name.contains('.') || is_descriptor {
                return Err(ConfigError::InvalidAnnotationName(name.clone()));
            }
        }

        Ok(())
    }
}
