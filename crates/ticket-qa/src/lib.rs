//! Support ticket quality review pipeline.
//!
//! Combines deterministic field checks with narrative quality judgments from
//! an external text-judgment backend, merges both into a unified per-criterion
//! score list, applies deduction and auto-fail policy, and orchestrates the
//! whole pipeline over batches of tickets with bounded concurrency.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
