//! Item records with their ground-truth categories.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{read_jsonl, ItemId};
use crate::error::EvalResult;

/// An item and its category labels (zero or more).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Produces items in a stable order.
pub trait ItemSource {
    fn load_items(&self) -> EvalResult<Vec<Item>>;
}

/// Items stored as JSON Lines.
#[derive(Debug, Clone)]
pub struct JsonlItemSource {
    path: PathBuf,
}

impl JsonlItemSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ItemSource for JsonlItemSource {
    fn load_items(&self) -> EvalResult<Vec<Item>> {
        let items: Vec<Item> = read_jsonl(&self.path)?;
        tracing::info!(path = %self.path.display(), items = items.len(), "Loaded items");
        Ok(items)
    }
}
