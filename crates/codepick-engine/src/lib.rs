//! # codepick-engine
//!
//! Search and hierarchical selection over ICD-10-CM, HCPCS and NDC code
//! catalogs.
//!
//! This crate provides:
//! - Catalog discovery and loading from JSON or CSV datasets
//! - Flattening of the three families into one searchable record sequence
//! - [`CodeStore`], an indexed view of that sequence
//! - Multi-term search with per-family counts
//! - [`SelectionEngine`], with category and subtree toggling, three
//!   ordered groups, and CSV import and export
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use codepick_engine::{load_catalog_dir, CodeStore, SelectionEngine};
//!
//! let catalog = load_catalog_dir("data/")?;
//! let store = Arc::new(CodeStore::from_catalog(&catalog));
//!
//! let mut engine = SelectionEngine::new(store);
//! engine.set_query("cholera");
//! engine.select_all();
//! engine.toggle("Durable Medical Equipment");
//!
//! engine.export_csv(std::io::stdout())?;
//! ```
//!
//! ## Features
//!
//! - `parallel` (default): builds search text on the rayon thread pool

#![warn(missing_docs)]

pub mod export;
pub mod flatten;
pub mod hierarchy;
pub mod import;
pub mod loader;
pub mod normalize;
pub mod parser;
pub mod reconcile;
pub mod search;
pub mod selection;
pub mod store;
pub mod types;

pub use export::{write_selection, EXPORT_HEADER};
pub use flatten::{flatten_catalog, flatten_diagnoses, flatten_drugs, flatten_procedures};
pub use hierarchy::build_diagnosis_tree;
pub use import::{parse_import, ImportFile, ImportRow};
pub use loader::{discover_catalog_files, load_catalog, load_catalog_dir};
pub use parser::{CatalogParser, CatalogRecord};
pub use reconcile::{MatchedCode, Reconciler, Reconciliation};
pub use search::{search, FamilyCounts, SearchResults};
pub use selection::{CheckState, ImportSummary, SelectionEngine};
pub use store::{Category, CodeStore, SelectTarget};
pub use types::{
    CatalogConfig, CatalogFiles, CodepickError, CodepickResult, ParseStats, SearchConfig,
};

// Re-export codepick-types for convenience
pub use codepick_types;
