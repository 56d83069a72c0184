//! LinkedIn activity intelligence: a fixed multi-stage analysis pipeline
//! over an append-only state aggregate.

pub mod analytics;
pub mod client;
pub mod config;
pub mod domain;
pub mod ingestion;
pub mod logging;
pub mod narrative;
pub mod pipeline;

pub use pipeline::{Engine, EngineBuilder, PipelineState, RunReport};
