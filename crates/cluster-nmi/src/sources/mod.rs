//! Collaborators that feed the scoring pipeline.
//!
//! Each seam is a trait with one file-backed implementation:
//!
//! | Trait | Implementation | Format |
//! |-------|----------------|--------|
//! | [`ItemSource`] | [`JsonlItemSource`] | `{"id": .., "categories": [..]}` per line |
//! | [`VectorSource`] | [`JsonlVectorSource`] | `{"id": .., "vector": [..]}` per line |
//! | [`ModelRepository`] | [`DirectoryModelRepository`] | one JSON centroid model per file |
//!
//! Items and vectors are paired by position, so both files must list items in
//! the same order.

pub mod items;
pub mod models;
pub mod vectors;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{EvalError, EvalResult};

pub use items::{Item, ItemSource, JsonlItemSource};
pub use models::{
    select_models, CentroidModel, ClusterPredictor, DirectoryModelRepository, ModelRepository,
};
pub use vectors::{ItemVector, JsonlVectorSource, VectorSource};

/// Opaque item identifier, numeric or textual.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Number(u64),
    Text(String),
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemId::Number(n) => write!(f, "{}", n),
            ItemId::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for ItemId {
    fn from(n: u64) -> Self {
        ItemId::Number(n)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        ItemId::Text(s.to_string())
    }
}

/// Read one JSON record per non-blank line.
pub(crate) fn read_jsonl<T: DeserializeOwned>(path: &Path) -> EvalResult<Vec<T>> {
    let file = File::open(path).map_err(|e| EvalError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let reader = BufReader::new(file);
    let mut records = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result.map_err(|e| EvalError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        if line.trim().is_empty() {
            continue;
        }

        let record: T = serde_json::from_str(&line).map_err(|e| EvalError::Parse {
            path: path.to_path_buf(),
            line: line_num + 1,
            reason: e.to_string(),
        })?;

        records.push(record);
    }

    tracing::debug!(path = %path.display(), records = records.len(), "Loaded JSONL file");
    Ok(records)
}

/// Check that items and vectors describe the same items in the same order.
///
/// Counts must always match. Identifiers are compared only when `strict`.
pub fn check_alignment(items: &[Item], vectors: &[ItemVector], strict: bool) -> EvalResult<()> {
    if items.len() != vectors.len() {
        return Err(EvalError::Alignment(format!(
            "{} items but {} vectors",
            items.len(),
            vectors.len()
        )));
    }

    if strict {
        if let Some((pos, (item, vector))) = items
            .iter()
            .zip(vectors)
            .enumerate()
            .find(|(_, (item, vector))| item.id != vector.id)
        {
            return Err(EvalError::Alignment(format!(
                "position {}: item id {} does not match vector id {}",
                pos, item.id, vector.id
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u64) -> Item {
        Item {
            id: ItemId::Number(id),
            categories: vec![],
        }
    }

    fn vector(id: u64) -> ItemVector {
        ItemVector {
            id: ItemId::Number(id),
            vector: vec![0.0],
        }
    }

    #[test]
    fn test_item_id_untagged() {
        let n: ItemId = serde_json::from_str("42").unwrap();
        let s: ItemId = serde_json::from_str("\"Q42\"").unwrap();
        assert_eq!(n, ItemId::Number(42));
        assert_eq!(s, ItemId::from("Q42"));
        assert_eq!(n.to_string(), "42");
    }

    #[test]
    fn test_alignment_count_mismatch() {
        let err = check_alignment(&[item(1), item(2)], &[vector(1)], false).unwrap_err();
        assert!(matches!(err, EvalError::Alignment(_)));
    }

    #[test]
    fn test_alignment_ids_only_when_strict() {
        let items = [item(1), item(2)];
        let vectors = [vector(2), vector(1)];

        assert!(check_alignment(&items, &vectors, false).is_ok());
        let err = check_alignment(&items, &vectors, true).unwrap_err();
        assert!(err.to_string().contains("position 0"));
    }
}
