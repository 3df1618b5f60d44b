//! # BioNER
//!
//! Runs a BERT token classifier over biomedical text and folds its subword
//! output back into whole entity mentions, served over HTTP.
#![forbid(unsafe_code)]

/// Models
pub mod models;

/// Pipelines
pub mod pipelines;

/// HTTP server
pub mod server;

/// Utilities
pub mod utils;

pub use pipelines::token_classification::{merge_entities, MergedEntity, NerPipeline, TokenResult};
pub use server::{create_router, AppState};
