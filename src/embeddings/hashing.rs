//! FNV-1a feature hashing embedder
//!
//! Deterministic, dependency-free fallback used when no embedding service
//! is configured. Lowercased word tokens are hashed into `dimension`
//! buckets with a sign bit, then the vector is L2-normalised, so squared
//! L2 distance between two embeddings lies in `[0, 4]`.

use async_trait::async_trait;

use super::Embedder;
use crate::errors::AgriSenseError;
use crate::errors::Result;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(AgriSenseError::ConfigError(
                "hash embedder dimension must be greater than zero".to_string(),
            ));
        }
        Ok(Self { dimension })
    }

    /// Synchronous embedding; the async trait method delegates here
    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        let lowered = text.to_lowercase();
        for token in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let hash = fnv1a(token.as_bytes());
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_sync(text))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DistanceMetric;

    #[test]
    fn test_fnv1a_reference_values() {
        assert_eq!(fnv1a(b""), FNV_OFFSET_BASIS);
        assert_eq!(fnv1a(b"a"), 0xaf63_dc4c_8601_ec8c);
    }

    #[test]
    fn test_deterministic_and_normalized() {
        let embedder = HashEmbedder::new(64).unwrap();
        let a = embedder.embed_sync("Wheat rust control in Punjab");
        let b = embedder.embed_sync("wheat RUST control, in punjab!");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_unrelated_texts_are_far_apart() {
        let embedder = HashEmbedder::new(384).unwrap();
        let a = embedder.embed_sync("What crops should I grow in Punjab during winter?");
        let b = embedder.embed_sync("How do I apply for the drip irrigation subsidy?");
        assert!(DistanceMetric::L2.distance(&a, &b) > 0.3);
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(HashEmbedder::new(0).is_err());
    }
}
