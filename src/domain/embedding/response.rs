//! Embedding response types

use serde::{Deserialize, Serialize};

/// Response from an embedding request, one vector per input in input order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingResponse {
    model: String,
    data: Vec<Vec<f32>>,
}

impl EmbeddingResponse {
    pub fn new(model: impl Into<String>, data: Vec<Vec<f32>>) -> Self {
        Self {
            model: model.into(),
            data,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn vectors(&self) -> &[Vec<f32>] {
        &self.data
    }

    /// Consume the response and return the first vector
    pub fn into_first(self) -> Option<Vec<f32>> {
        self.data.into_iter().next()
    }
}
