//! Precomputed feature vectors keyed by item identifier.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{read_jsonl, ItemId};
use crate::error::EvalResult;

/// Feature vector for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemVector {
    pub id: ItemId,
    pub vector: Vec<f32>,
}

/// Produces vectors in the same order as the item source.
pub trait VectorSource {
    fn load_vectors(&self) -> EvalResult<Vec<ItemVector>>;
}

/// Vectors stored as JSON Lines.
#[derive(Debug, Clone)]
pub struct JsonlVectorSource {
    path: PathBuf,
}

impl JsonlVectorSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl VectorSource for JsonlVectorSource {
    fn load_vectors(&self) -> EvalResult<Vec<ItemVector>> {
        let vectors: Vec<ItemVector> = read_jsonl(&self.path)?;
        tracing::info!(path = %self.path.display(), vectors = vectors.len(), "Loaded vectors");
        Ok(vectors)
    }
}
