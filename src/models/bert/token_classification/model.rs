use std::path::Path;

use anyhow::anyhow;
use candle_core::{DType, Device, Module, Tensor, D};
use candle_nn::{Linear, VarBuilder, VarMap};
use candle_transformers::models::bert::BertModel;

use super::Config;

/// BERT for Token Classification
pub struct Model {
    /// The base BERT model
    model: BertModel,

    /// Linear layer projecting each hidden state onto the classes
    output: Linear,

    /// Total number of classes
    n_classes: usize,
}

impl Model {
    /// Build the model from a weight store laid out like `BertForTokenClassification`
    pub fn load(vb: VarBuilder, config: &Config) -> candle_core::Result<Self> {
        // Fine-tuned checkpoints nest the encoder under `bert.`, bare encoders don't
        let model = BertModel::load(vb.pp("bert"), &config.model).or_else(|e| {
            log::debug!("No encoder under `bert.`, retrying at the root: {}", e);
            BertModel::load(vb.clone(), &config.model)
        })?;

        let n_classes = config.n_classes();
        let output = load_head(&vb, config.model.hidden_size, n_classes)?;

        Ok(Self {
            model,
            output,
            n_classes,
        })
    }

    /// Load weights from a `.safetensors` file, or a PyTorch pickle for anything else
    pub fn load_from_file(
        weights_file: &Path,
        config: &Config,
        device: &Device,
    ) -> anyhow::Result<Self> {
        let is_safetensors = weights_file
            .extension()
            .is_some_and(|ext| ext == "safetensors");

        let vb = if is_safetensors {
            let buffer = std::fs::read(weights_file).map_err(|e| {
                anyhow!("Unable to read {}: {}", weights_file.display(), e)
            })?;
            VarBuilder::from_buffered_safetensors(buffer, DType::F32, device)
        } else {
            VarBuilder::from_pth(weights_file, DType::F32, device)
        }
        .map_err(|e| anyhow!("Unable to load trained model weights: {}", e))?;

        Self::load(vb, config).map_err(|e| anyhow!("Unable to build model: {}", e))
    }

    /// Number of classes the head predicts
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Defines forward pass for inference.
    ///
    /// Takes a single `[1, seq_length]` sequence and returns class
    /// probabilities shaped `[seq_length, n_classes]`.
    pub fn infer(&self, input_ids: &Tensor, attention_mask: &Tensor) -> candle_core::Result<Tensor> {
        let token_type_ids = input_ids.zeros_like()?;

        let hidden_states = self
            .model
            .forward(input_ids, &token_type_ids, Some(attention_mask))?;

        let output = self.output.forward(&hidden_states)?;

        candle_nn::ops::softmax(&output, D::Minus1)?.squeeze(0)
    }
}

/// Load the `classifier` head, or start one at random when the checkpoint has none.
///
/// A head that is present but the wrong shape is an error.
fn load_head(vb: &VarBuilder, hidden_size: usize, n_classes: usize) -> candle_core::Result<Linear> {
    let classifier = vb.pp("classifier");

    if classifier.contains_tensor("weight") {
        return candle_nn::linear(hidden_size, n_classes, classifier);
    }

    log::warn!(
        "Checkpoint has no token classification head, initializing {} classes at random",
        n_classes
    );

    let varmap = VarMap::new();
    let head = VarBuilder::from_varmap(&varmap, vb.dtype(), vb.device());
    candle_nn::linear(hidden_size, n_classes, head.pp("classifier"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn weights(tensors: Vec<(&str, Tensor)>) -> VarBuilder<'static> {
        let tensors: HashMap<String, Tensor> = tensors
            .into_iter()
            .map(|(name, tensor)| (name.to_string(), tensor))
            .collect();

        VarBuilder::from_tensors(tensors, DType::F32, &Device::Cpu)
    }

    #[test]
    fn uses_checkpoint_head_when_present() {
        let vb = weights(vec![
            ("classifier.weight", Tensor::ones((3, 4), DType::F32, &Device::Cpu).unwrap()),
            ("classifier.bias", Tensor::zeros(3, DType::F32, &Device::Cpu).unwrap()),
        ]);

        let head = load_head(&vb, 4, 3).unwrap();

        assert_eq!(head.weight().dims(), &[3, 4]);
        assert_eq!(
            head.weight().sum_all().unwrap().to_scalar::<f32>().unwrap(),
            12.0
        );
    }

    #[test]
    fn initializes_missing_head() {
        let vb = weights(vec![]);

        let head = load_head(&vb, 4, 2).unwrap();

        assert_eq!(head.weight().dims(), &[2, 4]);
    }

    #[test]
    fn rejects_head_of_the_wrong_shape() {
        let vb = weights(vec![
            ("classifier.weight", Tensor::ones((5, 4), DType::F32, &Device::Cpu).unwrap()),
            ("classifier.bias", Tensor::zeros(5, DType::F32, &Device::Cpu).unwrap()),
        ]);

        assert!(load_head(&vb, 4, 3).is_err());
    }
}
