use std::path::Path;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use crate::pipelines::{
    token_classification::DEFAULT_IGNORE_LABELS,
    Pipeline,
};

/// The sentence analyzed on every request
pub const DEFAULT_TEXT: &str =
    "The patient was prescribed Paracetamol and Amoxicillin to treat a bacterial infection.";

/// Server configuration, read from an optional YAML file and then
/// overridden by command line flags
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,

    /// Port to bind
    pub port: u16,

    /// Verbose logging
    pub debug: bool,

    /// Model name on the Hugging Face Hub, or a local directory
    pub model: String,

    /// Sentence analyzed on every request
    pub text: String,

    /// Labels dropped from the pipeline output before merging
    pub ignore_labels: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            debug: false,
            model: Pipeline::TokenClassification.default_model().to_string(),
            text: DEFAULT_TEXT.to_string(),
            ignore_labels: DEFAULT_IGNORE_LABELS.iter().map(|l| l.to_string()).collect(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a YAML file, filling gaps with defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Unable to read config file {}: {}", path.display(), e))?;

        Self::from_yaml(&contents)
            .map_err(|e| anyhow!("Unable to parse config file {}: {}", path.display(), e))
    }

    /// Parse YAML configuration, filling gaps with defaults
    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        // An empty document deserializes as null rather than an empty mapping
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        Ok(serde_yaml::from_str(yaml)?)
    }

    /// The `host:port` address to bind
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
