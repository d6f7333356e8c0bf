//! Shared types, error model, and configuration for jobscout.
//!
//! This crate is the foundation depended on by all other jobscout crates.
//! It provides:
//! - [`JobScoutError`]: the unified error type
//! - Domain types ([`Identifier`], [`Record`], [`CategoryLabel`], [`AggregateSummary`])
//! - Configuration ([`AppConfig`], [`CollectorConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CollectorConfig, CollectorSection, OutputSection, PacingConfig, PacingSection,
    SourceConfig, SourceSection, config_dir, config_file_path, init_config, load_config,
    load_config_from,
};
pub use error::{JobScoutError, Result};
pub use types::{
    AggregateSummary, CategoryLabel, Classifications, Identifier, Position, Record, RunId,
    SectionLabel, Sections, UNKNOWN_COUNTRY,
};
