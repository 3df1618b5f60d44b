use std::{collections::BTreeMap, path::Path};

use anyhow::anyhow;
use candle_transformers::models::bert;
use serde::Deserialize;
use serde_json::{json, Value};

/// Max position embeddings for BERT-base when the config leaves it out
const DEFAULT_MAX_POSITION_EMBEDDINGS: usize = 512;

/// The Model Configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// The encoder configuration
    pub model: bert::Config,
    /// Longest token sequence the position embeddings cover
    pub max_position_embeddings: usize,
    /// A map from class ids to class name labels
    pub id2label: BTreeMap<usize, String>,
}

/// The fields of a Hugging Face `config.json` the classifier head needs
#[derive(Deserialize)]
struct Head {
    #[serde(default = "default_max_position_embeddings")]
    max_position_embeddings: usize,
    #[serde(default)]
    id2label: Option<BTreeMap<String, String>>,
}

fn default_max_position_embeddings() -> usize {
    DEFAULT_MAX_POSITION_EMBEDDINGS
}

impl Config {
    /// Load a Hugging Face `config.json`
    pub fn load(config_file: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(config_file).map_err(|e| {
            anyhow!(
                "Unable to read config file {}: {}",
                config_file.display(),
                e
            )
        })?;

        Self::from_json(&json)
    }

    /// Parse the contents of a Hugging Face `config.json`
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let mut value: Value = serde_json::from_str(json)
            .map_err(|e| anyhow!("Unable to parse config JSON: {}", e))?;

        // Google-format `bert_config.json` files predate these keys
        if let Some(fields) = value.as_object_mut() {
            for (key, default) in [
                ("layer_norm_eps", json!(1e-12)),
                ("pad_token_id", json!(0)),
                ("position_embedding_type", json!("absolute")),
                ("use_cache", json!(true)),
            ] {
                fields.entry(key).or_insert(default);
            }
        }

        let model: bert::Config = serde_json::from_value(value.clone())
            .map_err(|e| anyhow!("Unable to parse BERT config: {}", e))?;
        let head: Head = serde_json::from_value(value)
            .map_err(|e| anyhow!("Unable to parse classifier config: {}", e))?;

        // Transformers falls back to a binary head when no labels are configured
        let id2label = match head.id2label {
            Some(labels) => labels
                .into_iter()
                .map(|(id, label)| {
                    id.parse::<usize>()
                        .map(|id| (id, label))
                        .map_err(|_| anyhow!("Invalid class id in id2label: {:?}", id))
                })
                .collect::<anyhow::Result<BTreeMap<_, _>>>()?,
            None => BTreeMap::from([(0, "LABEL_0".to_string()), (1, "LABEL_1".to_string())]),
        };

        if id2label.is_empty() {
            return Err(anyhow!("Classes are not defined in the model configuration"));
        }

        Ok(Config {
            model,
            max_position_embeddings: head.max_position_embeddings,
            id2label,
        })
    }

    /// Number of output classes of the classifier head
    pub fn n_classes(&self) -> usize {
        self.id2label.len()
    }

    /// Class name for a class id
    pub fn label(&self, class: usize) -> Option<&str> {
        self.id2label.get(&class).map(String::as_str)
    }
}
