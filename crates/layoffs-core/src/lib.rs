//! Core types and transformations for the tech-layoffs ETL pipeline.
//!
//! Everything here is storage-agnostic: the bronze/silver CSV stages, the
//! star-schema builder and the [`warehouse::Warehouse`] trait that database
//! backends implement.

pub mod clean;
pub mod dataset;
pub mod error;
pub mod ingest;
pub mod record;
pub mod star;
pub mod table;
pub mod validation;
pub mod warehouse;

pub use error::{Error, Result};
