/// BERT for Token Classification Config
pub mod config;

/// BERT for Token Classification
pub mod model;

pub use config::Config;
pub use model::Model;
