//! Clustering entropy H(W) and category entropy H(C).
//!
//! Two formulas are available and are never mixed within one report:
//!
//! - [`EntropyFormula::Literal`] computes `-Σ count_k / N` with no log factor.
//!   Scores produced this way match the historical batch job bit for bit on
//!   the same tables, which is why it is the default.
//! - [`EntropyFormula::Shannon`] computes the classical `-Σ p_k ln p_k`, which
//!   turns the final score into the textbook `2·I(W;C) / (H(W) + H(C))`.

use std::hash::Hash;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::counts::{CountTables, MarginalTable};

/// Formula used for the marginal entropies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntropyFormula {
    /// `-Σ count_k / N`.
    #[default]
    Literal,
    /// `-Σ p_k ln p_k`.
    Shannon,
}

impl EntropyFormula {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntropyFormula::Literal => "literal",
            EntropyFormula::Shannon => "shannon",
        }
    }
}

impl std::fmt::Display for EntropyFormula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntropyFormula {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "literal" => Ok(EntropyFormula::Literal),
            "shannon" => Ok(EntropyFormula::Shannon),
            other => Err(format!(
                "unknown entropy formula '{}': expected literal or shannon",
                other
            )),
        }
    }
}

/// Entropy of one marginal table with denominator `n`.
pub fn marginal_entropy<K: Eq + Hash>(table: &MarginalTable<K>, n: f64, formula: EntropyFormula) -> f64 {
    match formula {
        EntropyFormula::Literal => -table.iter().map(|(_, count)| count as f64 / n).sum::<f64>(),
        EntropyFormula::Shannon => -table
            .iter()
            .map(|(_, count)| {
                let p = count as f64 / n;
                if p > 0.0 {
                    p * p.ln()
                } else {
                    0.0
                }
            })
            .sum::<f64>(),
    }
}

/// H(W) and H(C) for one model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntropyPair {
    /// Clustering entropy H(W).
    pub clustering: f64,
    /// Category entropy H(C).
    pub category: f64,
}

impl EntropyPair {
    pub fn sum(&self) -> f64 {
        self.clustering + self.category
    }
}

/// Compute both marginal entropies from the materialized tables.
pub fn entropies(tables: &CountTables, formula: EntropyFormula) -> EntropyPair {
    let n = tables.denominator();
    EntropyPair {
        clustering: marginal_entropy(tables.clusters(), n, formula),
        category: marginal_entropy(tables.categories(), n, formula),
    }
}
