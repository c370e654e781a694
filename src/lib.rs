// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod aggregate;
pub mod analyze;
pub mod api;
pub mod assistant;
pub mod config;
pub mod error;
pub mod fetch;
pub mod identity;
pub mod metrics;
pub mod pipeline;
pub mod text;

// ---- Re-exports for stable public API ----
pub use crate::aggregate::{aggregate, AggregateResult, WeightTable, WEIGHTS};
pub use crate::analyze::{Source, SourceResult, Verdict};
pub use crate::api::router;
pub use crate::pipeline::{MultiReport, Pipeline, SingleReport};
