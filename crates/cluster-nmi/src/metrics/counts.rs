//! Joint and marginal frequency tables.
//!
//! The joint table is built with a parallel fold over partitions of the
//! observations followed by a merge reduce. Count addition is associative and
//! commutative, so any partitioning recombines to the same table. Marginals are
//! derived from the joint table, never from raw items, so their totals equal the
//! observation count.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::observations::{build_observations, Observation};

/// Denominator used when turning counts into probabilities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Divide by the number of items evaluated. Cluster probabilities sum to
    /// one; category probabilities may exceed one with multi-label items.
    #[default]
    ItemCount,
    /// Divide by the number of observations.
    ObservationCount,
}

impl Normalization {
    pub fn as_str(&self) -> &'static str {
        match self {
            Normalization::ItemCount => "item_count",
            Normalization::ObservationCount => "observation_count",
        }
    }
}

impl std::fmt::Display for Normalization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Normalization {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "item_count" | "items" => Ok(Normalization::ItemCount),
            "observation_count" | "observations" => Ok(Normalization::ObservationCount),
            other => Err(format!(
                "unknown normalization '{}': expected item_count or observation_count",
                other
            )),
        }
    }
}

/// `(cluster, category) -> count`, holding only positive counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JointCountTable {
    counts: HashMap<(usize, String), u64>,
}

impl JointCountTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` occurrences of `(cluster, category)`. Zero counts are ignored.
    pub fn add(&mut self, cluster: usize, category: &str, count: u64) {
        if count == 0 {
            return;
        }
        *self
            .counts
            .entry((cluster, category.to_string()))
            .or_insert(0) += count;
    }

    /// Record a single observation.
    pub fn record(&mut self, observation: &Observation) {
        self.add(observation.cluster, &observation.category, 1);
    }

    /// Combine two partial tables by summing counts key by key.
    pub fn merge(self, other: Self) -> Self {
        let (mut larger, smaller) = if self.counts.len() >= other.counts.len() {
            (self, other)
        } else {
            (other, self)
        };
        for (key, count) in smaller.counts {
            *larger.counts.entry(key).or_insert(0) += count;
        }
        larger
    }

    /// Aggregate observations in parallel.
    pub fn from_observations(observations: &[Observation]) -> Self {
        observations
            .par_iter()
            .fold(JointCountTable::new, |mut table, obs| {
                table.record(obs);
                table
            })
            .reduce(JointCountTable::new, JointCountTable::merge)
    }

    /// Recombine tables built independently over partitions of the same collection.
    pub fn from_partitions<I>(partials: I) -> Self
    where
        I: IntoIterator<Item = JointCountTable>,
    {
        partials
            .into_iter()
            .fold(JointCountTable::new(), JointCountTable::merge)
    }

    pub fn get(&self, cluster: usize, category: &str) -> u64 {
        self.counts
            .get(&(cluster, category.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str, u64)> + '_ {
        self.counts
            .iter()
            .map(|((cluster, category), &count)| (*cluster, category.as_str(), count))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts, i.e. the number of observations.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Collapse onto the cluster dimension.
    pub fn cluster_marginal(&self) -> MarginalTable<usize> {
        let mut counts: HashMap<usize, u64> = HashMap::new();
        for ((cluster, _), &count) in &self.counts {
            *counts.entry(*cluster).or_insert(0) += count;
        }
        MarginalTable { counts }
    }

    /// Collapse onto the category dimension.
    pub fn category_marginal(&self) -> MarginalTable<String> {
        let mut counts: HashMap<String, u64> = HashMap::new();
        for ((_, category), &count) in &self.counts {
            *counts.entry(category.clone()).or_insert(0) += count;
        }
        MarginalTable { counts }
    }
}

/// Counts per value of one dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarginalTable<K: Eq + Hash> {
    counts: HashMap<K, u64>,
}

impl<K: Eq + Hash> MarginalTable<K> {
    pub fn get<Q>(&self, key: &Q) -> u64
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, u64)> + '_ {
        self.counts.iter().map(|(k, &v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }
}

/// Materialized tables for one model's evaluation.
///
/// Built once, borrowed read-only by the entropy and mutual-information
/// calculators, and dropped once the model's score has been produced.
#[derive(Debug, Clone)]
pub struct CountTables {
    joint: JointCountTable,
    clusters: MarginalTable<usize>,
    categories: MarginalTable<String>,
    item_count: usize,
    normalization: Normalization,
}

impl CountTables {
    /// Derive both marginals from an aggregated joint table.
    pub fn from_joint(joint: JointCountTable, item_count: usize, normalization: Normalization) -> Self {
        let clusters = joint.cluster_marginal();
        let categories = joint.category_marginal();

        tracing::debug!(
            joint_entries = joint.len(),
            clusters = clusters.len(),
            categories = categories.len(),
            item_count,
            "Aggregated count tables"
        );

        Self {
            joint,
            clusters,
            categories,
            item_count,
            normalization,
        }
    }

    /// Build observations from positionally aligned assignments and category
    /// sets, then aggregate them. The item count is the number of assignments.
    pub fn build(clusters: &[usize], categories: &[Vec<String>], normalization: Normalization) -> Self {
        let observations = build_observations(clusters, categories);
        let joint = JointCountTable::from_observations(&observations);
        Self::from_joint(joint, clusters.len(), normalization)
    }

    pub fn joint(&self) -> &JointCountTable {
        &self.joint
    }

    pub fn clusters(&self) -> &MarginalTable<usize> {
        &self.clusters
    }

    pub fn categories(&self) -> &MarginalTable<String> {
        &self.categories
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn observation_count(&self) -> u64 {
        self.joint.total()
    }

    pub fn normalization(&self) -> Normalization {
        self.normalization
    }

    /// Probability denominator `N` under the configured normalization.
    pub fn denominator(&self) -> f64 {
        match self.normalization {
            Normalization::ItemCount => self.item_count as f64,
            Normalization::ObservationCount => self.observation_count() as f64,
        }
    }

    /// Whether both partitions have at most one block.
    pub fn is_trivial(&self) -> bool {
        self.clusters.len() <= 1 && self.categories.len() <= 1
    }
}
