/// BERT for Token Classification (such as named entity recognition)
pub mod token_classification;

/// WordPiece tokenizer loading
pub mod tokenizer;

/// Model Variants
/// --------------

/// BioBERT v1.1, cased, pre-trained on PubMed abstracts
pub const BIOBERT_BASE_CASED: &str = "dmis-lab/biobert-base-cased-v1.1";
