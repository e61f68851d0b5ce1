//! JSON report generation.
//!
//! JSON has no literal for NaN or infinities, so each entry carries the
//! finite score (or `null`) plus the rendered score text.

use serde::{Deserialize, Serialize};

use super::format_score;
use crate::runners::{BatchReport, ModelOutcome};

/// Complete JSON report structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonReport {
    pub metadata: ReportMetadata,
    pub summary: ReportSummary,
    pub models: Vec<ModelEntry>,
}

/// Report metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Report version for schema compatibility.
    pub version: String,
    /// Timestamp of generation.
    pub generated_at: String,
    pub technique: String,
    pub normalization: String,
    pub entropy_formula: String,
    pub item_count: usize,
    pub duration_ms: u64,
}

/// Batch-level summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub models_total: usize,
    pub models_scored: usize,
    pub models_degenerate: usize,
    pub models_failed: usize,
    pub best_model: Option<String>,
    pub best_score: Option<f64>,
}

/// One model's result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEntry {
    pub model: String,
    pub status: String,
    /// Finite score, `null` when degenerate or failed.
    pub score: Option<f64>,
    /// Score as printed in the CSV report.
    pub score_text: Option<String>,
    pub clustering_entropy: Option<f64>,
    pub category_entropy: Option<f64>,
    pub mutual_information: Option<f64>,
    pub observation_count: Option<u64>,
    pub cluster_count: Option<usize>,
    pub category_count: Option<usize>,
    pub error: Option<String>,
}

impl JsonReport {
    pub fn from_batch(report: &BatchReport) -> Self {
        let models: Vec<ModelEntry> = report
            .records
            .iter()
            .map(|record| match &record.outcome {
                ModelOutcome::Scored(eval) => ModelEntry {
                    model: record.model.clone(),
                    status: if eval.score.is_degenerate() {
                        "degenerate".into()
                    } else {
                        "scored".into()
                    },
                    score: eval.score.finite(),
                    score_text: Some(format_score(eval.score.value())),
                    clustering_entropy: finite(eval.entropies.clustering),
                    category_entropy: finite(eval.entropies.category),
                    mutual_information: finite(eval.mutual_information),
                    observation_count: Some(eval.observation_count),
                    cluster_count: Some(eval.cluster_count),
                    category_count: Some(eval.category_count),
                    error: None,
                },
                ModelOutcome::Failed { reason } => ModelEntry {
                    model: record.model.clone(),
                    status: "failed".into(),
                    score: None,
                    score_text: None,
                    clustering_entropy: None,
                    category_entropy: None,
                    mutual_information: None,
                    observation_count: None,
                    cluster_count: None,
                    category_count: None,
                    error: Some(reason.clone()),
                },
            })
            .collect();

        let best = report.best();
        let summary = ReportSummary {
            models_total: models.len(),
            models_scored: models.iter().filter(|m| m.status == "scored").count(),
            models_degenerate: models.iter().filter(|m| m.status == "degenerate").count(),
            models_failed: models.iter().filter(|m| m.status == "failed").count(),
            best_model: best.map(|(m, _)| m.to_string()),
            best_score: best.map(|(_, s)| s),
        };

        Self {
            metadata: ReportMetadata {
                version: env!("CARGO_PKG_VERSION").to_string(),
                generated_at: chrono::Utc::now().to_rfc3339(),
                technique: report.technique.clone(),
                normalization: report.settings.normalization.to_string(),
                entropy_formula: report.settings.entropy.to_string(),
                item_count: report.item_count,
                duration_ms: report.duration_ms,
            },
            summary,
            models,
        }
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}
