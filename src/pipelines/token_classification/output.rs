use derive_new::new;
use serde::{Deserialize, Serialize};

/// A single sub-token as classified by the model.
///
/// The serialized field names follow the usual token-classification pipeline
/// output (`word`, `entity`, `score`), so recorded pipeline output can be read
/// back directly. All three fields are required.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, new)]
pub struct TokenResult {
    /// The raw token, possibly carrying the `##` continuation marker
    #[serde(rename = "word")]
    pub text: String,

    /// The predicted entity class
    #[serde(rename = "entity")]
    pub label: String,

    /// Probability of the predicted class, in `[0, 1]`
    #[serde(rename = "score")]
    pub confidence: f64,
}

/// An entity mention reassembled from one leading token and its continuations
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, new)]
pub struct MergedEntity {
    /// Surface form with continuation markers stripped
    pub text: String,

    /// Label of the leading token
    pub label: String,

    /// Highest confidence among the folded tokens
    pub confidence: f64,
}

impl From<MergedEntity> for TokenResult {
    fn from(entity: MergedEntity) -> Self {
        TokenResult::new(entity.text, entity.label, entity.confidence)
    }
}
