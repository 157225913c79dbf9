//! Embedding request types

use serde::{Deserialize, Serialize};

/// Request to embed one or more texts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    model: String,
    input: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

impl EmbeddingRequest {
    pub fn new(model: impl Into<String>, input: Vec<String>) -> Self {
        Self {
            model: model.into(),
            input,
            dimensions: None,
        }
    }

    /// Create a request for a single text
    pub fn single(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(model, vec![text.into()])
    }

    /// Set the output dimensions
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn inputs(&self) -> &[String] {
        &self.input
    }

    pub fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_request() {
        let request = EmbeddingRequest::single("text-embedding-3-small", "what is the fee?");

        assert_eq!(request.model(), "text-embedding-3-small");
        assert_eq!(request.inputs(), &["what is the fee?".to_string()]);
        assert!(request.dimensions().is_none());
    }

    #[test]
    fn test_serialization_skips_dimensions() {
        let request = EmbeddingRequest::single("m", "x");
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("dimensions").is_none());

        let json = serde_json::to_value(request.with_dimensions(256)).unwrap();
        assert_eq!(json["dimensions"], 256);
    }
}
