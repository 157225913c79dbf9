//! Deterministic offline embedder

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::domain::embedding::{EmbeddingProvider, EmbeddingRequest, EmbeddingResponse};
use crate::domain::text::tokens;
use crate::domain::DomainError;

/// Feature-hashing embedder: every token is hashed into a signed bucket and the
/// vector is L2-normalised. Texts sharing tokens get similar vectors.
#[derive(Debug, Clone)]
pub struct HashEmbeddingProvider {
    dimensions: usize,
}

impl HashEmbeddingProvider {
    pub fn new(dimensions: usize) -> Result<Self, DomainError> {
        if dimensions == 0 {
            return Err(DomainError::configuration(
                "Embedding dimensions must be greater than zero",
            ));
        }
        Ok(Self { dimensions })
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        for token in tokens(text) {
            let digest = Sha256::digest(token.as_bytes());
            let mut bucket_bytes = [0u8; 8];
            bucket_bytes.copy_from_slice(&digest[..8]);
            let bucket = (u64::from_be_bytes(bucket_bytes) % self.dimensions as u64) as usize;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in vector.iter_mut() {
                *value /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbeddingProvider {
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, DomainError> {
        let vectors = request
            .inputs()
            .iter()
            .map(|text| self.embed_text(text))
            .collect();
        Ok(EmbeddingResponse::new(request.model(), vectors))
    }

    fn provider_name(&self) -> &'static str {
        "hash"
    }
}
