//! The seven-stage Tier 3 decision pipeline (spec.md §2, §4). Each stage
//! lives under `stages/`; `DecisionContext` is the shared accumulator;
//! `Pipeline::run` is the orchestrator used by the API layer.

pub mod context;
pub mod pipeline;
pub mod stages;

pub use context::{AvtStatus, DecisionContext, PosRequest};
pub use pipeline::{DecisionResult, Pipeline};
