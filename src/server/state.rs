use std::sync::Arc;

use crate::pipelines::token_classification::NerPipeline;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// The loaded NER pipeline, read-only for the life of the process
    pub pipeline: Arc<dyn NerPipeline>,

    /// The sentence every request analyzes
    pub text: String,
}

impl AppState {
    /// Create new application state
    pub fn new(pipeline: Arc<dyn NerPipeline>, text: impl Into<String>) -> Self {
        Self {
            pipeline,
            text: text.into(),
        }
    }
}
