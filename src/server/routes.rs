use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::pipelines::token_classification::{merge_entities, MergedEntity};

use super::{AppState, ServerResult};

/// One merged entity as returned to clients
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityResponse {
    /// Surface form of the entity
    #[serde(rename = "Entity")]
    pub entity: String,

    /// Predicted class
    #[serde(rename = "Label")]
    pub label: String,

    /// Confidence with two decimal places
    #[serde(rename = "Confidence")]
    pub confidence: String,
}

impl From<MergedEntity> for EntityResponse {
    fn from(entity: MergedEntity) -> Self {
        Self {
            entity: entity.text,
            label: entity.label,
            confidence: format!("{:.2}", entity.confidence),
        }
    }
}

/// Liveness probe body
#[derive(Debug, Serialize, Deserialize)]
pub struct Health {
    /// Always `"ok"`
    pub status: String,
}

/// Run NER over the configured sentence and return the merged entities
pub async fn entities(State(state): State<Arc<AppState>>) -> ServerResult<Json<Vec<EntityResponse>>> {
    let tokens = state.pipeline.run(&state.text).await?;
    let merged = merge_entities(&tokens)?;

    log::debug!("Returning {} entities", merged.len());

    Ok(Json(merged.into_iter().map(EntityResponse::from).collect()))
}

/// Report that the server is up
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
    })
}
