//! Catalog discovery and loading.
//!
//! A catalog directory holds up to one dataset file per family, named by
//! prefix:
//!
//! - `icd10cm*.json` (diagnosis tree) or `icd10cm*.csv` (flat `code,name`),
//! - `hcpcs*.json` or `hcpcs*.csv` (`code,name,category`),
//! - `ndc*.json` or `ndc*.csv` (`code,name,manufacturer,packageSize`).
//!
//! Families without a file load empty.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;

use codepick_types::{Catalog, DiagnosisNode, DrugCode, ProcedureCode};

use crate::hierarchy::build_diagnosis_tree;
use crate::normalize::{format_ndc, procedure_category};
use crate::parser::{CatalogParser, CatalogRecord};
use crate::types::{CatalogConfig, CatalogFiles, CodepickError, CodepickResult};

/// A row of a flat diagnosis listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosisEntry {
    /// Diagnosis code, with or without its dot.
    pub code: String,
    /// Description.
    pub name: String,
}

impl CatalogRecord for DiagnosisEntry {
    const REQUIRED_COLUMNS: &'static [&'static str] = &["code", "name"];

    fn from_fields(fields: &[&str]) -> Self {
        Self {
            code: fields[0].to_string(),
            name: fields[1].to_string(),
        }
    }
}

impl CatalogRecord for ProcedureCode {
    const REQUIRED_COLUMNS: &'static [&'static str] = &["code", "name"];
    const OPTIONAL_COLUMNS: &'static [&'static str] = &["category"];

    fn from_fields(fields: &[&str]) -> Self {
        ProcedureCode::new(fields[0], fields[1], fields[2])
    }
}

impl CatalogRecord for DrugCode {
    const REQUIRED_COLUMNS: &'static [&'static str] = &["code", "name"];
    const OPTIONAL_COLUMNS: &'static [&'static str] = &["manufacturer", "packageSize"];

    fn from_fields(fields: &[&str]) -> Self {
        DrugCode {
            code: fields[0].to_string(),
            name: fields[1].to_string(),
            manufacturer: fields[2].to_string(),
            package_size: fields[3].to_string(),
        }
    }
}

/// Diagnosis JSON, either wrapped as `{"icd10cm": {"codes": [...]}}` or a
/// bare array of root nodes.
#[derive(Deserialize)]
#[serde(untagged)]
enum DiagnosisFile {
    Wrapped { icd10cm: CodeList<DiagnosisNode> },
    Bare(Vec<DiagnosisNode>),
}

/// Procedure and drug JSON, either `{"codes": [...]}` or a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListFile<T> {
    Wrapped(CodeList<T>),
    Bare(Vec<T>),
}

#[derive(Deserialize)]
struct CodeList<T> {
    codes: Vec<T>,
}

impl<T> ListFile<T> {
    fn into_codes(self) -> Vec<T> {
        match self {
            ListFile::Wrapped(list) => list.codes,
            ListFile::Bare(codes) => codes,
        }
    }
}

/// Discovers catalog dataset files in a directory.
///
/// File name prefixes are matched ignoring case. When several files share a
/// prefix, the first in name order is used.
///
/// # Errors
/// - [`CodepickError::DirectoryNotFound`] if `path` is not a directory,
/// - [`CodepickError::NoCatalogFiles`] if no dataset file is present.
pub fn discover_catalog_files<P: AsRef<Path>>(path: P) -> CodepickResult<CatalogFiles> {
    let path = path.as_ref();

    if !path.is_dir() {
        return Err(CodepickError::DirectoryNotFound {
            path: path.display().to_string(),
        });
    }

    let mut entries: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            entries.push(entry.path());
        }
    }
    entries.sort();

    let mut files = CatalogFiles::new();
    for entry in entries {
        let Some(filename) = entry.file_name().map(|n| n.to_string_lossy().to_lowercase()) else {
            continue;
        };

        let slot = if filename.starts_with("icd10cm") {
            match_extension(&filename, &mut files.diagnosis_json, &mut files.diagnosis_csv)
        } else if filename.starts_with("hcpcs") {
            match_extension(&filename, &mut files.procedure_json, &mut files.procedure_csv)
        } else if filename.starts_with("ndc") {
            match_extension(&filename, &mut files.drug_json, &mut files.drug_csv)
        } else {
            None
        };

        if let Some(slot) = slot {
            if slot.is_none() {
                *slot = Some(entry);
            }
        }
    }

    if !files.has_any() {
        return Err(CodepickError::NoCatalogFiles {
            directory: path.display().to_string(),
        });
    }

    let missing = files.missing_families();
    if !missing.is_empty() {
        tracing::warn!(
            missing = %missing.join(", "),
            "catalog families without a dataset file load empty"
        );
    }

    Ok(files)
}

fn match_extension<'a>(
    filename: &str,
    json: &'a mut Option<PathBuf>,
    csv: &'a mut Option<PathBuf>,
) -> Option<&'a mut Option<PathBuf>> {
    if filename.ends_with(".json") {
        Some(json)
    } else if filename.ends_with(".csv") {
        Some(csv)
    } else {
        None
    }
}

/// Discovers and loads a catalog directory with default settings.
pub fn load_catalog_dir<P: AsRef<Path>>(path: P) -> CodepickResult<Catalog> {
    let files = discover_catalog_files(path)?;
    load_catalog(&files, &CatalogConfig::default())
}

/// Loads the datasets listed in `files`.
///
/// A JSON file takes precedence over a CSV file for the same family.
///
/// # Errors
/// Returns the first I/O, JSON or CSV error encountered.
pub fn load_catalog(files: &CatalogFiles, config: &CatalogConfig) -> CodepickResult<Catalog> {
    let diagnoses = match (&files.diagnosis_json, &files.diagnosis_csv) {
        (Some(path), _) => load_diagnosis_json(path)?,
        (None, Some(path)) => load_diagnosis_csv(path)?,
        (None, None) => Vec::new(),
    };

    let procedures = match (&files.procedure_json, &files.procedure_csv) {
        (Some(path), _) => read_json_list::<ProcedureCode>(path)?,
        (None, Some(path)) => CatalogParser::<_, ProcedureCode>::from_path(path)?.parse_all()?,
        (None, None) => Vec::new(),
    };

    let drugs = match (&files.drug_json, &files.drug_csv) {
        (Some(path), _) => read_json_list::<DrugCode>(path)?,
        (None, Some(path)) => CatalogParser::<_, DrugCode>::from_path(path)?.parse_all()?,
        (None, None) => Vec::new(),
    };

    let catalog = Catalog {
        diagnoses,
        procedures: prepare_procedures(procedures, config),
        drugs: prepare_drugs(drugs, config),
    };

    tracing::info!(
        diagnoses = catalog.diagnosis_count(),
        procedures = catalog.procedures.len(),
        drugs = catalog.drugs.len(),
        "loaded catalog"
    );

    Ok(catalog)
}

/// Reads a diagnosis tree from JSON.
pub fn load_diagnosis_json<P: AsRef<Path>>(path: P) -> CodepickResult<Vec<DiagnosisNode>> {
    let file: DiagnosisFile = read_json(path.as_ref())?;
    Ok(match file {
        DiagnosisFile::Wrapped { icd10cm } => icd10cm.codes,
        DiagnosisFile::Bare(nodes) => nodes,
    })
}

/// Reads a flat `code,name` diagnosis listing and rebuilds its tree.
pub fn load_diagnosis_csv<P: AsRef<Path>>(path: P) -> CodepickResult<Vec<DiagnosisNode>> {
    let entries = CatalogParser::<_, DiagnosisEntry>::from_path(path)?.parse_all()?;
    let total = entries.len();

    let roots = build_diagnosis_tree(
        entries
            .into_iter()
            .filter(|e| !e.code.is_empty())
            .map(|e| (e.code, e.name)),
    );

    tracing::debug!(entries = total, roots = roots.len(), "built diagnosis tree from listing");
    Ok(roots)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> CodepickResult<T> {
    if !path.exists() {
        return Err(CodepickError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

fn read_json_list<T: DeserializeOwned>(path: &Path) -> CodepickResult<Vec<T>> {
    let file: ListFile<T> = read_json(path)?;
    Ok(file.into_codes())
}

fn prepare_procedures(
    procedures: Vec<ProcedureCode>,
    config: &CatalogConfig,
) -> Vec<ProcedureCode> {
    let total = procedures.len();
    let mut derived = 0usize;

    let prepared: Vec<ProcedureCode> = procedures
        .into_iter()
        .filter(|p| !p.code.trim().is_empty())
        .map(|mut p| {
            if config.derive_missing_categories && p.category.trim().is_empty() {
                p.category = procedure_category(&p.code).to_string();
                derived += 1;
            }
            p
        })
        .collect();

    if prepared.len() < total {
        tracing::warn!(
            skipped = total - prepared.len(),
            "skipped procedure entries without a code"
        );
    }
    if derived > 0 {
        tracing::debug!(derived, "derived procedure categories from codes");
    }

    prepared
}

fn prepare_drugs(drugs: Vec<DrugCode>, config: &CatalogConfig) -> Vec<DrugCode> {
    let total = drugs.len();
    let mut seen: HashSet<String> = HashSet::with_capacity(total);

    let prepared: Vec<DrugCode> = drugs
        .into_iter()
        .filter(|d| !d.code.trim().is_empty())
        .map(|mut d| {
            d.code = format_ndc(d.code.trim());
            d
        })
        .filter(|d| !config.dedupe_drugs || seen.insert(d.code.clone()))
        .collect();

    if prepared.len() < total {
        tracing::warn!(
            removed = total - prepared.len(),
            "removed drug entries that were blank or repeated"
        );
    }

    prepared
}
