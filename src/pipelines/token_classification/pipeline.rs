use async_trait::async_trait;

use crate::pipelines::PipelineError;

use super::TokenResult;

/// Anything that can turn raw text into per-token classification results.
///
/// Results must be in left-to-right order, with subword fragments carrying
/// the `##` continuation marker.
#[async_trait]
pub trait NerPipeline: Send + Sync {
    /// Classify every token of the given text
    async fn run(&self, text: &str) -> Result<Vec<TokenResult>, PipelineError>;
}
