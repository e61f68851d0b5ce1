//! Joint observations: one `(cluster, category)` pair per item category.
//!
//! Categories are not mutually exclusive, so an item with `k` categories yields
//! `k` observations sharing its cluster and an item with none yields nothing.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// A single `(cluster, category)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Observation {
    /// Cluster the item was assigned to.
    pub cluster: usize,
    /// One of the item's category labels.
    pub category: String,
}

/// Flatten per-item cluster assignments and category sets into observations.
///
/// The two slices are paired by position; only the common prefix is used.
/// Output order follows item order.
pub fn build_observations(clusters: &[usize], categories: &[Vec<String>]) -> Vec<Observation> {
    clusters
        .par_iter()
        .zip(categories.par_iter())
        .flat_map_iter(|(&cluster, labels)| {
            labels.iter().map(move |category| Observation {
                cluster,
                category: category.clone(),
            })
        })
        .collect()
}

/// Number of observations the given category sets produce.
pub fn observation_count(categories: &[Vec<String>]) -> usize {
    categories.iter().map(Vec::len).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(sets: &[&[&str]]) -> Vec<Vec<String>> {
        sets.iter()
            .map(|s| s.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_one_observation_per_category() {
        let clusters = vec![0, 1, 1];
        let categories = labels(&[&["physics"], &["history", "art"], &["art"]]);

        let obs = build_observations(&clusters, &categories);

        assert_eq!(obs.len(), 4);
        assert_eq!(obs.len(), observation_count(&categories));
        assert_eq!(
            obs[1],
            Observation {
                cluster: 1,
                category: "history".into()
            }
        );
        assert_eq!(obs[2].cluster, 1);
        assert_eq!(obs[2].category, "art");
    }

    #[test]
    fn test_uncategorized_items_contribute_nothing() {
        let clusters = vec![0, 1, 2];
        let categories = labels(&[&[], &["a"], &[]]);

        let obs = build_observations(&clusters, &categories);

        assert_eq!(obs.len(), 1);
        assert_eq!(obs[0].cluster, 1);
    }

    #[test]
    fn test_preserves_item_order_at_scale() {
        let n = 10_000;
        let clusters: Vec<usize> = (0..n).collect();
        let categories: Vec<Vec<String>> = (0..n).map(|i| vec![format!("c{}", i)]).collect();

        let obs = build_observations(&clusters, &categories);

        assert_eq!(obs.len(), n);
        assert!(obs
            .iter()
            .enumerate()
            .all(|(i, o)| o.cluster == i && o.category == format!("c{}", i)));
    }

    #[test]
    fn test_pairs_common_prefix_only() {
        let clusters = vec![0, 1, 2];
        let categories = labels(&[&["a"], &["b"]]);

        let obs = build_observations(&clusters, &categories);
        assert_eq!(obs.len(), 2);
    }
}
