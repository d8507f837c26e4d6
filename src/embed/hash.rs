use crate::embed::EmbeddingProvider;
use crate::error::Result;

/// Offline provider: FNV-hashed bag of words, L2-normalized.
///
/// Only catches literal word overlap, not paraphrase. Good enough for local
/// runs without an API key.
#[derive(Debug, Clone)]
pub struct HashEmbeddingProvider {
    dim: usize,
}

impl HashEmbeddingProvider {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(8) }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    fn bucket(&self, token: &str) -> usize {
        let mut h: u64 = 0xcbf29ce484222325;
        for b in token.as_bytes() {
            h ^= *b as u64;
            h = h.wrapping_mul(0x100000001b3);
        }
        (h % self.dim as u64) as usize
    }
}

impl Default for HashEmbeddingProvider {
    fn default() -> Self {
        Self { dim: 256 }
    }
}

impl EmbeddingProvider for HashEmbeddingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0.0f32; self.dim];

        let lowered = text.to_lowercase();
        for token in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            v[self.bucket(token)] += 1.0;
        }

        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }

        Ok(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::cosine_similarity;

    #[test]
    fn fixed_dimension_with_floor() {
        assert_eq!(HashEmbeddingProvider::new(2).dim(), 8);
        let v = HashEmbeddingProvider::new(64).embed("How do I reset my password?").unwrap();
        assert_eq!(v.len(), 64);
    }

    #[test]
    fn casing_and_punctuation_do_not_matter() {
        let p = HashEmbeddingProvider::default();
        let a = p.embed("How do I reset my password?").unwrap();
        let b = p.embed("how do i RESET my password").unwrap();
        assert!((cosine_similarity(&a, &b).unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn blank_text_is_zero_vector() {
        let v = HashEmbeddingProvider::default().embed("  ?! ").unwrap();
        assert!(v.iter().all(|x| *x == 0.0));
    }
}
