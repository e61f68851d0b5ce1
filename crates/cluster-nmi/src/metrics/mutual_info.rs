//! Mutual information and the normalized score.
//!
//! score = -2 / (H(W) + H(C)) · Σ Pwc · ln(Pwc / (Pw · Pc))   (literal entropies)
//! score =  2 / (H(W) + H(C)) · Σ Pwc · ln(Pwc / (Pw · Pc))   (Shannon entropies)
//!
//! Marginals come from the same joint table, so every joint entry has nonzero
//! Pw and Pc and the logarithm is always defined.

use serde::{Deserialize, Serialize};

use super::counts::CountTables;
use super::entropy::{entropies, EntropyFormula, EntropyPair};
use crate::config::EvalSettings;

/// Normalized score for one model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NmiScore {
    /// A usable score.
    Finite(f64),
    /// The score is undefined for these tables. Holds the non-finite value the
    /// division produced, or NaN when the partitions are trivial.
    Degenerate(f64),
}

impl NmiScore {
    /// Raw numeric value (non-finite for degenerate scores).
    pub fn value(&self) -> f64 {
        match *self {
            NmiScore::Finite(v) | NmiScore::Degenerate(v) => v,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        matches!(self, NmiScore::Degenerate(_))
    }

    /// The score, if it is usable for ranking.
    pub fn finite(&self) -> Option<f64> {
        match *self {
            NmiScore::Finite(v) => Some(v),
            NmiScore::Degenerate(_) => None,
        }
    }
}

impl std::fmt::Display for NmiScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&crate::reports::format_score(self.value()))
    }
}

/// Score plus the quantities it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct NmiEvaluation {
    pub score: NmiScore,
    pub entropies: EntropyPair,
    /// Σ Pwc · ln(Pwc / (Pw · Pc)).
    pub mutual_information: f64,
    pub item_count: usize,
    pub observation_count: u64,
    pub cluster_count: usize,
    pub category_count: usize,
}

/// Summed mutual-information terms over all joint entries.
pub fn mutual_information_sum(tables: &CountTables) -> f64 {
    let n = tables.denominator();
    let clusters = tables.clusters();
    let categories = tables.categories();

    tables
        .joint()
        .iter()
        .map(|(cluster, category, count)| {
            let pc = categories.get(category) as f64 / n;
            let pw = clusters.get(&cluster) as f64 / n;
            let pwc = count as f64 / n;
            pwc * (pwc / (pw * pc)).ln()
        })
        .sum()
}

/// Combine the mutual-information sum with the two entropies.
pub fn compute_nmi(tables: &CountTables, formula: EntropyFormula) -> NmiEvaluation {
    let entropies = entropies(tables, formula);
    let mutual_information = mutual_information_sum(tables);
    let denom = entropies.sum();

    let raw = match formula {
        EntropyFormula::Literal => -2.0 / denom * mutual_information,
        EntropyFormula::Shannon => 2.0 / denom * mutual_information,
    };

    let score = if !raw.is_finite() {
        NmiScore::Degenerate(raw)
    } else if denom == 0.0 || tables.is_trivial() {
        NmiScore::Degenerate(f64::NAN)
    } else {
        NmiScore::Finite(raw)
    };

    NmiEvaluation {
        score,
        entropies,
        mutual_information,
        item_count: tables.item_count(),
        observation_count: tables.observation_count(),
        cluster_count: tables.clusters().len(),
        category_count: tables.categories().len(),
    }
}

/// Run the full pipeline for one set of cluster assignments.
///
/// `clusters[i]` and `categories[i]` must describe the same item.
pub fn evaluate(clusters: &[usize], categories: &[Vec<String>], settings: &EvalSettings) -> NmiEvaluation {
    let tables = CountTables::build(clusters, categories, settings.normalization);
    compute_nmi(&tables, settings.entropy)
}
