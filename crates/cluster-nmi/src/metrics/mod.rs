//! Aggregation and scoring pipeline.
//!
//! - **Observations**: one `(cluster, category)` pair per item category
//! - **Counts**: joint table plus cluster and category marginals
//! - **Entropy**: H(W) and H(C) from the marginals
//! - **Mutual information**: joint terms combined into the normalized score

pub mod counts;
pub mod entropy;
pub mod mutual_info;
pub mod observations;

pub use counts::{CountTables, JointCountTable, MarginalTable, Normalization};
pub use entropy::{entropies, marginal_entropy, EntropyFormula, EntropyPair};
pub use mutual_info::{compute_nmi, evaluate, mutual_information_sum, NmiEvaluation, NmiScore};
pub use observations::{build_observations, observation_count, Observation};
