use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::embed::EmbeddingProvider;
use crate::error::{DedupError, Result};

/// Fixed text-to-vector table, loaded from a JSON object such as
/// `{"A": [1.0, 0.0], "B": [0.99, 0.14]}`. Text not in the table is a
/// provider failure.
#[derive(Debug, Clone, Default)]
pub struct FixtureEmbeddingProvider {
    vectors: HashMap<String, Vec<f32>>,
}

impl FixtureEmbeddingProvider {
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<f32>)>,
        S: Into<String>,
    {
        Self {
            vectors: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            DedupError::InvalidArg(format!("open fixtures {}: {e}", path.display()))
        })?;
        let vectors: HashMap<String, Vec<f32>> = serde_json::from_reader(BufReader::new(file))?;
        tracing::debug!(path = %path.display(), entries = vectors.len(), "loaded embedding fixtures");
        Ok(Self { vectors })
    }
}

impl EmbeddingProvider for FixtureEmbeddingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.vectors
            .get(text)
            .cloned()
            .ok_or_else(|| DedupError::Provider(format!("no fixture embedding for {text:?}")))
    }
}
