//! Batch driver: score every model of one clustering technique.
//!
//! For each model name in lexical order: load the predictor, assign every item
//! to a cluster, build the count tables, and score. A model that cannot be
//! loaded or applied becomes a failed record and the batch moves on.

use std::time::Instant;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::EvalSettings;
use crate::error::{EvalError, EvalResult};
use crate::metrics::{evaluate, NmiEvaluation};
use crate::sources::{check_alignment, Item, ItemVector, ModelRepository};

/// What happened to one model.
#[derive(Debug, Clone)]
pub enum ModelOutcome {
    Scored(NmiEvaluation),
    Failed { reason: String },
}

/// Result for one model.
#[derive(Debug, Clone)]
pub struct ModelRecord {
    /// Model name as listed by the repository.
    pub model: String,
    pub outcome: ModelOutcome,
}

impl ModelRecord {
    pub fn evaluation(&self) -> Option<&NmiEvaluation> {
        match &self.outcome {
            ModelOutcome::Scored(eval) => Some(eval),
            ModelOutcome::Failed { .. } => None,
        }
    }
}

/// Results of one batch, ordered by model name.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub technique: String,
    pub settings: EvalSettings,
    pub item_count: usize,
    pub records: Vec<ModelRecord>,
    pub duration_ms: u64,
}

impl BatchReport {
    /// Models that produced a score (finite or degenerate).
    pub fn scored(&self) -> impl Iterator<Item = (&str, &NmiEvaluation)> + '_ {
        self.records
            .iter()
            .filter_map(|r| r.evaluation().map(|e| (r.model.as_str(), e)))
    }

    /// Models that could not be scored, with the reason.
    pub fn failed(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.records.iter().filter_map(|r| match &r.outcome {
            ModelOutcome::Failed { reason } => Some((r.model.as_str(), reason.as_str())),
            ModelOutcome::Scored(_) => None,
        })
    }

    /// Model with the highest finite score. Ties keep the earliest name.
    pub fn best(&self) -> Option<(&str, f64)> {
        self.scored()
            .filter_map(|(model, eval)| eval.score.finite().map(|s| (model, s)))
            .fold(None, |best: Option<(&str, f64)>, (model, score)| match best {
                Some((_, top)) if top >= score => best,
                _ => Some((model, score)),
            })
    }
}

/// Scores every model a repository holds for one technique.
pub struct BatchDriver<R: ModelRepository> {
    repository: R,
    settings: EvalSettings,
}

impl<R: ModelRepository> BatchDriver<R> {
    pub fn new(repository: R, settings: EvalSettings) -> Self {
        Self {
            repository,
            settings,
        }
    }

    pub fn settings(&self) -> &EvalSettings {
        &self.settings
    }

    /// Run the batch.
    ///
    /// Fails only on problems that affect every model: misaligned or empty
    /// inputs and an unreadable repository.
    pub fn run(
        &self,
        technique: &str,
        items: &[Item],
        vectors: &[ItemVector],
    ) -> EvalResult<BatchReport> {
        check_alignment(items, vectors, self.settings.strict_alignment)?;
        if items.is_empty() {
            return Err(EvalError::EmptyInput("no items to evaluate".into()));
        }

        let start = Instant::now();
        let models = self.repository.list_models(technique)?;

        info!(
            technique,
            models = models.len(),
            items = items.len(),
            normalization = %self.settings.normalization,
            entropy = %self.settings.entropy,
            "Starting NMI batch"
        );

        if models.is_empty() {
            warn!(technique, "No models found for technique");
        }

        let features: Vec<&[f32]> = vectors.iter().map(|v| v.vector.as_slice()).collect();
        let categories: Vec<Vec<String>> = items.iter().map(|i| i.categories.clone()).collect();

        let records: Vec<ModelRecord> = if self.settings.parallel_models {
            models
                .par_iter()
                .map(|model| self.run_model(model, &features, &categories))
                .collect()
        } else {
            models
                .iter()
                .map(|model| self.run_model(model, &features, &categories))
                .collect()
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            technique,
            scored = records.iter().filter(|r| r.evaluation().is_some()).count(),
            duration_ms,
            "NMI batch completed"
        );

        Ok(BatchReport {
            technique: technique.to_string(),
            settings: self.settings,
            item_count: items.len(),
            records,
            duration_ms,
        })
    }

    fn run_model(&self, model: &str, features: &[&[f32]], categories: &[Vec<String>]) -> ModelRecord {
        let outcome = match self.score_model(model, features, categories) {
            Ok(eval) => {
                if eval.score.is_degenerate() {
                    warn!(
                        model,
                        clusters = eval.cluster_count,
                        categories = eval.category_count,
                        "Degenerate score: entropies do not support normalization"
                    );
                } else {
                    info!(model, score = eval.score.value(), "Scored model");
                }
                ModelOutcome::Scored(eval)
            }
            Err(e) => {
                warn!(model, error = %e, "Skipping model");
                ModelOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };

        ModelRecord {
            model: model.to_string(),
            outcome,
        }
    }

    fn score_model(
        &self,
        model: &str,
        features: &[&[f32]],
        categories: &[Vec<String>],
    ) -> EvalResult<NmiEvaluation> {
        let predictor = self.repository.load(model)?;
        let clusters = predictor.predict_all(features)?;
        Ok(evaluate(&clusters, categories, &self.settings))
    }
}
