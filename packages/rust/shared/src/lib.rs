//! Shared types, error model, and configuration for docreport.
//!
//! This crate is the foundation depended on by all other docreport crates.
//! It provides:
//! - [`DocReportError`] — the unified error type
//! - Domain types ([`PepRecord`], [`Report`])
//! - Configuration ([`AppConfig`], config loading, well-known paths)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, OutputConfig, SiteConfig, cache_db_path, config_dir, config_file_path, init_config,
    load_config, load_config_from,
};
pub use error::{DocReportError, Result};
pub use types::{PepRecord, Report};
