//! # Cluster NMI
//!
//! Ranks trained clustering models by how well their partitions agree with
//! ground-truth categories, using Normalized Mutual Information.
//!
//! Items may carry zero, one or many categories. Each `(item, category)` pair
//! becomes one observation, so the observation count generally differs from
//! the item count.
//!
//! ## Pipeline
//!
//! ```text
//! items + cluster assignments
//!     -> observations (cluster, category)
//!     -> joint counts + cluster/category marginals
//!     -> H(W), H(C), Σ Pwc·ln(Pwc / (Pw·Pc))
//!     -> score
//! ```
//!
//! ## Settings
//!
//! | Setting | Default | Alternative |
//! |---------|---------|-------------|
//! | Normalization | item count | observation count |
//! | Entropy formula | literal `-Σ count/N` | Shannon `-Σ p ln p` |
//!
//! ## Usage
//!
//! ```bash
//! nmi-eval kmeans data/items.jsonl data/vectors.jsonl --models-dir output
//! ```

pub mod config;
pub mod error;
pub mod metrics;
pub mod reports;
pub mod runners;
pub mod sources;

pub use crate::config::{EvalConfig, EvalSettings};
pub use error::{EvalError, EvalResult};
pub use metrics::{
    evaluate, CountTables, EntropyFormula, JointCountTable, NmiEvaluation, NmiScore,
    Normalization,
};
pub use reports::{JsonReport, ReportFormat};
pub use runners::{BatchDriver, BatchReport, ModelOutcome, ModelRecord};
pub use sources::{
    DirectoryModelRepository, Item, ItemSource, ItemVector, JsonlItemSource, JsonlVectorSource,
    ModelRepository, VectorSource,
};
