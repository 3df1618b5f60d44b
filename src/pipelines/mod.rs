use std::fmt::Display;

/// Token Classification (named entity recognition)
pub mod token_classification;

/// Available Pipelines
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Pipeline {
    /// Token Classification
    TokenClassification,
}

impl Pipeline {
    /// Get the unique string token that identifies this pipeline
    pub fn as_str(&self) -> &str {
        match self {
            Pipeline::TokenClassification => token_classification::PIPELINE,
        }
    }

    /// Get the default model for this pipeline
    pub fn default_model(&self) -> &'static str {
        match self {
            Pipeline::TokenClassification => token_classification::DEFAULT_MODEL,
        }
    }
}

impl TryFrom<&str> for Pipeline {
    type Error = PipelineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if value == token_classification::PIPELINE {
            Ok(Pipeline::TokenClassification)
        } else {
            Err(PipelineError::Unknown(value.to_string()))
        }
    }
}

impl Display for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pipeline Error
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// No pipeline found for the given string
    #[error("no pipeline found for {0}")]
    Unknown(String),

    /// The model files could not be fetched or read
    #[error("unable to load model: {0}")]
    Load(String),

    /// The tokenizer could not be built or failed to encode the input
    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    /// The forward pass failed
    #[error("inference failed: {0}")]
    Inference(String),
}

impl From<candle_core::Error> for PipelineError {
    fn from(err: candle_core::Error) -> Self {
        PipelineError::Inference(err.to_string())
    }
}
