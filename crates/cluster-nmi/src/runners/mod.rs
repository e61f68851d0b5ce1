//! Batch runners.

pub mod batch;

pub use batch::{BatchDriver, BatchReport, ModelOutcome, ModelRecord};
