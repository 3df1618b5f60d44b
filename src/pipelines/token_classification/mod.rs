/// Token results and merged entities
pub mod output;

/// Subword merging
pub mod merge;

/// The pipeline seam consumed by the server
pub mod pipeline;

/// BERT-backed inference
pub mod inference;

pub use inference::BertNer;
pub use merge::{merge_entities, parse_tokens, MergeError, CONTINUATION_MARKER};
pub use output::{MergedEntity, TokenResult};
pub use pipeline::NerPipeline;

/// The unique string token that identifies this pipeline
pub static PIPELINE: &str = "ner";

/// The default model to use for token classification
pub static DEFAULT_MODEL: &str = crate::models::bert::BIOBERT_BASE_CASED;

/// Labels dropped from pipeline output unless configured otherwise
pub const DEFAULT_IGNORE_LABELS: &[&str] = &["O"];
