//! atomizer - converts third-party attack technique test records into
//! normalized, directly executable abilities.
//!
//! This crate provides functionality to:
//! - Substitute declared default values for `#{name}` placeholders
//! - Extract file attachments referenced by corpus-relative paths
//! - Strip dialect-specific comments and join multi-line scripts
//! - Stage conditional prerequisite installs across shell dialects
//! - Walk a test corpus and persist one ability per record
pub mod config;
pub mod corpus;
pub mod error;
pub mod ingest;
pub mod normalize;
pub mod payload;
pub mod types;

// Re-export commonly used types
pub use config::IngestConfig;
pub use corpus::TacticMap;
pub use error::{Error, Result};
pub use ingest::{IngestService, IngestStats};
pub use normalize::CommandPreparer;
pub use payload::PayloadStore;
pub use types::*;
