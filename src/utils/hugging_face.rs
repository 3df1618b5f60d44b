use std::path::{Path, PathBuf};

use anyhow::anyhow;
use hf_hub::api::tokio::{Api, ApiRepo};

/// Weight files in order of preference
const WEIGHT_FILES: [&str; 2] = ["model.safetensors", "pytorch_model.bin"];

/// Where the tokenizer definition comes from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenizerFile {
    /// A serialized `tokenizer.json`
    Json(PathBuf),

    /// A bare WordPiece `vocab.txt`
    Vocab(PathBuf),
}

/// The local paths of everything needed to run a model
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelFiles {
    /// The Hugging Face `config.json`
    pub config: PathBuf,

    /// Model weights
    pub weights: PathBuf,

    /// Tokenizer definition
    pub tokenizer: TokenizerFile,
}

/// Resolve model files from a local directory, or else from the Hugging Face Hub
pub async fn fetch_model(model: &str) -> anyhow::Result<ModelFiles> {
    let dir = Path::new(model);

    if dir.is_dir() {
        log::debug!("Loading model files from {}", dir.display());
        return local_model(dir);
    }

    download_hf_model(model).await
}

/// Resolve model files inside a local directory
pub fn local_model(dir: &Path) -> anyhow::Result<ModelFiles> {
    let existing = |name: &str| Some(dir.join(name)).filter(|path| path.is_file());

    let config = existing("config.json")
        .ok_or_else(|| anyhow!("No config.json found in {}", dir.display()))?;

    let weights = WEIGHT_FILES
        .iter()
        .find_map(|name| existing(*name))
        .ok_or_else(|| anyhow!("No model weights found in {}", dir.display()))?;

    let tokenizer = existing("tokenizer.json")
        .map(TokenizerFile::Json)
        .or_else(|| existing("vocab.txt").map(TokenizerFile::Vocab))
        .ok_or_else(|| anyhow!("No tokenizer.json or vocab.txt found in {}", dir.display()))?;

    Ok(ModelFiles {
        config,
        weights,
        tokenizer,
    })
}

/// Download model config, weights and tokenizer from Hugging Face Hub
/// If files exist in cache, they will not be downloaded again
pub async fn download_hf_model(model_name: &str) -> anyhow::Result<ModelFiles> {
    let api = Api::new().map_err(|e| anyhow!("Unable to reach the Hugging Face Hub: {}", e))?;
    let repo = api.model(model_name.to_string());

    log::info!("Fetching {} from the Hugging Face Hub", model_name);

    let config = repo.get("config.json").await.map_err(|e| {
        anyhow!(
            "Failed to download: {} config with name: config.json from HuggingFace Hub: {}",
            model_name,
            e
        )
    })?;

    let mut weights = None;
    for name in WEIGHT_FILES {
        if let Some(path) = try_get(&repo, name).await {
            weights = Some(path);
            break;
        }
    }
    let weights = weights.ok_or_else(|| {
        anyhow!(
            "Failed to download: {} weights with name: {} from HuggingFace Hub",
            model_name,
            WEIGHT_FILES.join(" or ")
        )
    })?;

    let tokenizer = match try_get(&repo, "tokenizer.json").await {
        Some(path) => TokenizerFile::Json(path),
        None => TokenizerFile::Vocab(repo.get("vocab.txt").await.map_err(|e| {
            anyhow!(
                "Failed to download: {} tokenizer or vocabulary from HuggingFace Hub: {}",
                model_name,
                e
            )
        })?),
    };

    Ok(ModelFiles {
        config,
        weights,
        tokenizer,
    })
}

async fn try_get(repo: &ApiRepo, name: &str) -> Option<PathBuf> {
    match repo.get(name).await {
        Ok(path) => Some(path),
        Err(e) => {
            log::debug!("{} not available: {}", name, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("bioner-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn prefers_safetensors_and_tokenizer_json() {
        let dir = scratch_dir("preferred");
        for name in [
            "config.json",
            "model.safetensors",
            "pytorch_model.bin",
            "tokenizer.json",
            "vocab.txt",
        ] {
            fs::write(dir.join(name), b"").unwrap();
        }

        let files = local_model(&dir).unwrap();

        assert_eq!(files.weights, dir.join("model.safetensors"));
        assert_eq!(files.tokenizer, TokenizerFile::Json(dir.join("tokenizer.json")));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn falls_back_to_pickle_and_vocab() {
        let dir = scratch_dir("fallback");
        for name in ["config.json", "pytorch_model.bin", "vocab.txt"] {
            fs::write(dir.join(name), b"").unwrap();
        }

        let files = local_model(&dir).unwrap();

        assert_eq!(files.weights, dir.join("pytorch_model.bin"));
        assert_eq!(files.tokenizer, TokenizerFile::Vocab(dir.join("vocab.txt")));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_weights_is_an_error() {
        let dir = scratch_dir("missing");
        fs::write(dir.join("config.json"), b"{}").unwrap();

        let err = local_model(&dir).unwrap_err();

        assert!(err.to_string().contains("No model weights"));

        fs::remove_dir_all(&dir).unwrap();
    }
}
