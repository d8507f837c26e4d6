mod fixture;
mod hash;
mod openai;

pub use fixture::FixtureEmbeddingProvider;
pub use hash::HashEmbeddingProvider;
pub use openai::{DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL, OpenAiEmbeddingProvider};

use crate::error::Result;

/// Turns text into a fixed-length vector. Implementations may block on I/O
/// and must surface failures (including timeouts) as `DedupError::Provider`.
pub trait EmbeddingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

impl EmbeddingProvider for Box<dyn EmbeddingProvider> {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        (**self).embed(text)
    }
}

impl<T: EmbeddingProvider + ?Sized> EmbeddingProvider for &T {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        (**self).embed(text)
    }
}
