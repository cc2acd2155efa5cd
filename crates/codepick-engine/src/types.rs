//! Engine-wide error, result and configuration types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading catalogs or importing selections.
#[derive(Error, Debug)]
pub enum CodepickError {
    /// I/O error reading a catalog or import file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error (including invalid UTF-8 in a field).
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON catalog parsing error.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Missing required column in an import or catalog file.
    #[error("Missing required column: {column}")]
    MissingColumn {
        /// The name of the missing column.
        column: String,
    },

    /// Import file has no data rows.
    #[error("CSV file must have a header row and at least one data row (found {found} line(s))")]
    TooFewLines {
        /// Number of non-empty lines found.
        found: usize,
    },

    /// File not found.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Directory not found.
    #[error("Directory not found: {path}")]
    DirectoryNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Catalog directory holds none of the expected dataset files.
    #[error("No catalog files (icd10cm*, hcpcs*, ndc*) found in {directory}")]
    NoCatalogFiles {
        /// The directory that was searched.
        directory: String,
    },
}

/// Result type for engine operations.
pub type CodepickResult<T> = Result<T, CodepickError>;

/// Configuration for search result presentation.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Maximum number of records handed to the presentation layer.
    pub display_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { display_limit: 500 }
    }
}

/// Configuration for catalog loading.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Derive a category from the code for procedures that ship without one.
    pub derive_missing_categories: bool,
    /// Drop drug codes that repeat an earlier code.
    pub dedupe_drugs: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            derive_missing_categories: true,
            dedupe_drugs: true,
        }
    }
}

/// Dataset files discovered in a catalog directory.
#[derive(Debug, Clone, Default)]
pub struct CatalogFiles {
    /// Diagnosis tree in JSON.
    pub diagnosis_json: Option<PathBuf>,
    /// Flat `code,name` diagnosis listing.
    pub diagnosis_csv: Option<PathBuf>,
    /// Procedure codes in JSON.
    pub procedure_json: Option<PathBuf>,
    /// Procedure codes in CSV.
    pub procedure_csv: Option<PathBuf>,
    /// Drug codes in JSON.
    pub drug_json: Option<PathBuf>,
    /// Drug codes in CSV.
    pub drug_csv: Option<PathBuf>,
}

impl CatalogFiles {
    /// Creates a new empty file set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if at least one dataset file was found.
    pub fn has_any(&self) -> bool {
        self.diagnosis_json.is_some()
            || self.diagnosis_csv.is_some()
            || self.procedure_json.is_some()
            || self.procedure_csv.is_some()
            || self.drug_json.is_some()
            || self.drug_csv.is_some()
    }

    /// Returns the families with no dataset file.
    pub fn missing_families(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.diagnosis_json.is_none() && self.diagnosis_csv.is_none() {
            missing.push("ICD10");
        }
        if self.procedure_json.is_none() && self.procedure_csv.is_none() {
            missing.push("HCPCS");
        }
        if self.drug_json.is_none() && self.drug_csv.is_none() {
            missing.push("NDC");
        }
        missing
    }
}

/// Statistics from parsing an import file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Data rows read from the file (header excluded).
    pub total_rows: usize,
    /// Rows handed to the reconciler.
    pub accepted_rows: usize,
    /// Rows dropped for being shorter than the recognized columns.
    pub dropped_rows: usize,
}
