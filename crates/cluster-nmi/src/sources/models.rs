//! Model repository and cluster predictors.
//!
//! Models live in one directory. An entry is a model when its name ends with
//! the configured suffix and starts with the requested technique name. Names
//! are processed in ascending lexical order, so `kmeans_10.cm` sorts before
//! `kmeans_2.cm`.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{EvalError, EvalResult};

/// Maps a feature vector to a cluster index.
pub trait ClusterPredictor: Send + Sync {
    fn predict(&self, vector: &[f32]) -> EvalResult<usize>;

    /// Predict every vector in parallel, preserving input order.
    fn predict_all(&self, vectors: &[&[f32]]) -> EvalResult<Vec<usize>> {
        vectors.par_iter().map(|v| self.predict(v)).collect()
    }
}

/// Source of serialized clustering models.
pub trait ModelRepository: Send + Sync {
    /// Model names for `technique`, sorted ascending.
    fn list_models(&self, technique: &str) -> EvalResult<Vec<String>>;

    /// Load a predictor by name.
    fn load(&self, name: &str) -> EvalResult<Box<dyn ClusterPredictor>>;
}

/// Keep names ending in `suffix` and starting with `technique`, sorted lexically.
pub fn select_models<I>(names: I, technique: &str, suffix: &str) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut selected: Vec<String> = names
        .into_iter()
        .filter(|name| name.ends_with(suffix) && name.starts_with(technique))
        .collect();
    selected.sort();
    selected
}

/// k-means style model: a point is assigned to its nearest centroid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentroidModel {
    pub centroids: Vec<Vec<f32>>,
}

impl CentroidModel {
    /// Check that the model has centroids of one shared, nonzero dimension.
    pub fn validate(&self) -> Result<(), String> {
        let dim = match self.centroids.first() {
            Some(first) => first.len(),
            None => return Err("model has no centroids".into()),
        };
        if dim == 0 {
            return Err("centroids have zero dimension".into());
        }
        if let Some(pos) = self.centroids.iter().position(|c| c.len() != dim) {
            return Err(format!(
                "centroid {} has dimension {}, expected {}",
                pos,
                self.centroids[pos].len(),
                dim
            ));
        }
        Ok(())
    }

    pub fn dimension(&self) -> usize {
        self.centroids.first().map_or(0, Vec::len)
    }
}

fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

impl ClusterPredictor for CentroidModel {
    fn predict(&self, vector: &[f32]) -> EvalResult<usize> {
        let expected = self.dimension();
        if vector.len() != expected {
            return Err(EvalError::DimensionMismatch {
                expected,
                actual: vector.len(),
            });
        }

        // Strict comparison keeps the lowest index on ties.
        let mut best = 0;
        let mut best_dist = f32::INFINITY;
        for (idx, centroid) in self.centroids.iter().enumerate() {
            let dist = squared_distance(centroid, vector);
            if dist < best_dist {
                best = idx;
                best_dist = dist;
            }
        }
        Ok(best)
    }
}

/// Models stored as JSON files in a single directory.
#[derive(Debug, Clone)]
pub struct DirectoryModelRepository {
    dir: PathBuf,
    suffix: String,
}

impl DirectoryModelRepository {
    /// Open a repository rooted at `dir`, which must exist.
    pub fn open<P: AsRef<Path>>(dir: P, suffix: &str) -> EvalResult<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(EvalError::Config(format!(
                "models directory does not exist: {}",
                dir.display()
            )));
        }
        Ok(Self {
            dir: dir.to_path_buf(),
            suffix: suffix.to_string(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ModelRepository for DirectoryModelRepository {
    fn list_models(&self, technique: &str) -> EvalResult<Vec<String>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| EvalError::Io {
            path: self.dir.clone(),
            source: e,
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| EvalError::Io {
                path: self.dir.clone(),
                source: e,
            })?;
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => tracing::warn!(name = ?raw, "Skipping non UTF-8 model entry"),
            }
        }

        Ok(select_models(names, technique, &self.suffix))
    }

    fn load(&self, name: &str) -> EvalResult<Box<dyn ClusterPredictor>> {
        let path = self.dir.join(name);
        let content = fs::read_to_string(&path).map_err(|e| EvalError::ModelLoad {
            name: name.to_string(),
            reason: format!("{}: {}", path.display(), e),
        })?;

        let model: CentroidModel =
            serde_json::from_str(&content).map_err(|e| EvalError::ModelLoad {
                name: name.to_string(),
                reason: e.to_string(),
            })?;

        model.validate().map_err(|reason| EvalError::ModelLoad {
            name: name.to_string(),
            reason,
        })?;

        tracing::debug!(
            model = name,
            clusters = model.centroids.len(),
            dimension = model.dimension(),
            "Loaded centroid model"
        );
        Ok(Box::new(model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_lexical_not_numeric_order() {
        let selected = select_models(
            names(&["kmeans_2.cm", "kmeans_10.cm", "kmeans_1.cm"]),
            "kmeans",
            ".cm",
        );
        assert_eq!(selected, vec!["kmeans_1.cm", "kmeans_10.cm", "kmeans_2.cm"]);
    }

    #[test]
    fn test_filters_technique_and_suffix() {
        let selected = select_models(
            names(&[
                "kmeans_1.cm",
                "gmm_1.cm",
                "kmeans_1.cm.crc",
                "notes.txt",
                "kmeans_bisecting_3.cm",
            ]),
            "kmeans",
            ".cm",
        );
        assert_eq!(selected, vec!["kmeans_1.cm", "kmeans_bisecting_3.cm"]);
    }

    #[test]
    fn test_nearest_centroid() {
        let model = CentroidModel {
            centroids: vec![vec![0.0, 0.0], vec![10.0, 10.0]],
        };
        assert_eq!(model.predict(&[1.0, -1.0]).unwrap(), 0);
        assert_eq!(model.predict(&[9.0, 12.0]).unwrap(), 1);
        // equidistant
        assert_eq!(model.predict(&[5.0, 5.0]).unwrap(), 0);
    }

    #[test]
    fn test_predict_all_preserves_order() {
        let model = CentroidModel {
            centroids: vec![vec![0.0], vec![100.0]],
        };
        let data: Vec<Vec<f32>> = (0..1000).map(|i| vec![(i % 2) as f32 * 100.0]).collect();
        let refs: Vec<&[f32]> = data.iter().map(Vec::as_slice).collect();

        let clusters = model.predict_all(&refs).unwrap();
        assert!(clusters.iter().enumerate().all(|(i, &c)| c == i % 2));
    }

    #[test]
    fn test_dimension_mismatch() {
        let model = CentroidModel {
            centroids: vec![vec![0.0, 0.0]],
        };
        let err = model.predict(&[1.0]).unwrap_err();
        assert!(matches!(
            err,
            EvalError::DimensionMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_validate_rejects_ragged_and_empty() {
        assert!(CentroidModel { centroids: vec![] }.validate().is_err());
        assert!(CentroidModel {
            centroids: vec![vec![0.0, 1.0], vec![0.0]]
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_directory_repository() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("kmeans_2.cm"), r#"{"centroids": [[0.0], [1.0]]}"#).unwrap();
        fs::write(dir.path().join("kmeans_10.cm"), r#"{"centroids": [[0.0]]}"#).unwrap();
        fs::write(dir.path().join("kmeans_3.cm"), "garbage").unwrap();
        fs::write(dir.path().join("gmm_1.cm"), r#"{"centroids": [[0.0]]}"#).unwrap();

        let repo = DirectoryModelRepository::open(dir.path(), ".cm").unwrap();
        let models = repo.list_models("kmeans").unwrap();
        assert_eq!(models, vec!["kmeans_10.cm", "kmeans_2.cm", "kmeans_3.cm"]);

        let predictor = repo.load("kmeans_2.cm").unwrap();
        assert_eq!(predictor.predict(&[0.9]).unwrap(), 1);

        let err = repo.load("kmeans_3.cm").err().unwrap();
        assert!(matches!(err, EvalError::ModelLoad { .. }));
    }

    #[test]
    fn test_open_missing_dir() {
        let err = DirectoryModelRepository::open("/nonexistent/models", ".cm").unwrap_err();
        assert!(matches!(err, EvalError::Config(_)));
    }
}
