use std::sync::Arc;

use async_trait::async_trait;
use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;

use crate::{
    models::bert::{
        token_classification::{Config, Model},
        tokenizer,
    },
    pipelines::PipelineError,
    utils::{self, hugging_face::{self, ModelFiles, TokenizerFile}},
};

use super::{NerPipeline, TokenResult};

/// Named entity recognition backed by a BERT token classifier.
///
/// Cheap to clone; the loaded model is shared and never mutated.
#[derive(Clone)]
pub struct BertNer {
    inner: Arc<Classifier>,
}

struct Classifier {
    model: Model,
    config: Config,
    tokenizer: Tokenizer,
    ignore_labels: Vec<String>,
    device: Device,
}

impl BertNer {
    /// Load a model from a local directory or the Hugging Face Hub.
    ///
    /// Tokens predicted as one of `ignore_labels` are left out of the results.
    pub async fn load(model_name: &str, ignore_labels: Vec<String>) -> anyhow::Result<Self> {
        log::info!("Loading token classification model {}", model_name);

        let files = hugging_face::fetch_model(model_name).await?;

        // Reading and mapping the weights is blocking work
        let classifier =
            tokio::task::spawn_blocking(move || Classifier::load(files, ignore_labels)).await??;

        log::info!(
            "Model ready on {:?} with {} classes",
            classifier.device,
            classifier.model.n_classes()
        );

        Ok(Self {
            inner: Arc::new(classifier),
        })
    }

    /// The class names the model can predict, in class id order
    pub fn labels(&self) -> Vec<&str> {
        self.inner.config.id2label.values().map(String::as_str).collect()
    }
}

#[async_trait]
impl NerPipeline for BertNer {
    async fn run(&self, text: &str) -> Result<Vec<TokenResult>, PipelineError> {
        let inner = self.inner.clone();
        let text = text.to_string();

        tokio::task::spawn_blocking(move || inner.classify(&text))
            .await
            .map_err(|e| PipelineError::Inference(format!("inference task failed: {}", e)))?
    }
}

impl Classifier {
    fn load(files: ModelFiles, ignore_labels: Vec<String>) -> anyhow::Result<Self> {
        let device = utils::device()?;
        let config = Config::load(&files.config)?;

        let tokenizer = match &files.tokenizer {
            TokenizerFile::Json(path) => tokenizer::from_json(path)?,
            TokenizerFile::Vocab(path) => tokenizer::from_vocab(path)?,
        };

        let model = Model::load_from_file(&files.weights, &config, &device)?;

        Ok(Self {
            model,
            config,
            tokenizer,
            ignore_labels,
            device,
        })
    }

    fn classify(&self, text: &str) -> Result<Vec<TokenResult>, PipelineError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| PipelineError::Tokenizer(e.to_string()))?;

        let ids = encoding.get_ids();
        if ids.len() > self.config.max_position_embeddings {
            return Err(PipelineError::Inference(format!(
                "input is {} tokens long, the model accepts at most {}",
                ids.len(),
                self.config.max_position_embeddings
            )));
        }

        let input_ids = Tensor::new(ids, &self.device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(encoding.get_attention_mask(), &self.device)?.unsqueeze(0)?;

        let probabilities = self
            .model
            .infer(&input_ids, &attention_mask)?
            .to_vec2::<f32>()?;

        let mut results = Vec::with_capacity(ids.len());

        for ((token, special), scores) in encoding
            .get_tokens()
            .iter()
            .zip(encoding.get_special_tokens_mask())
            .zip(probabilities)
        {
            if *special == 1 {
                continue;
            }

            let (class, score) = scores
                .iter()
                .copied()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(&b.1))
                .ok_or_else(|| PipelineError::Inference("model returned no classes".to_string()))?;

            let label = self.config.label(class).ok_or_else(|| {
                PipelineError::Inference(format!("class {} has no label", class))
            })?;

            if self.ignore_labels.iter().any(|ignored| ignored == label) {
                continue;
            }

            results.push(TokenResult::new(
                token.clone(),
                label.to_string(),
                f64::from(score),
            ));
        }

        log::debug!(
            "Classified {} tokens, kept {}",
            encoding.get_tokens().len(),
            results.len()
        );

        Ok(results)
    }
}
