//! Orchestration for the tech-layoffs ETL pipeline.
//!
//! Runs ingest → clean → star schema → load → validate against the paths
//! and database named in a [`PipelineConfig`].

pub mod settings;
pub mod pipeline;
pub mod progress;
pub mod report;

pub use settings::PipelineConfig;
pub use pipeline::{RunSummary, run};
