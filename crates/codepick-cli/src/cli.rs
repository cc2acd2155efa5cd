//! Command line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use codepick_types::{CodeFamily, TypeFilter};

#[derive(Parser)]
#[command(
    name = "codepick",
    version,
    about = "Search, select and group ICD-10-CM, HCPCS and NDC codes",
    long_about = "Search, select and group medical codes.\n\n\
                  Loads ICD-10-CM, HCPCS and NDC datasets from a catalog directory\n\
                  and reads or writes grouped selections as CSV."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Catalog directory (default: $CODEPICK_DATA_PATH, then ./data).
    #[arg(long = "data", value_name = "DIR", global = true)]
    pub data: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Search the catalog.
    Search(SearchArgs),

    /// Toggle codes, categories or subtrees and print the resulting groups.
    Select(SelectArgs),

    /// Import a selection CSV and print how it was reconciled.
    Import(ImportArgs),

    /// Print catalog statistics.
    Stats,
}

#[derive(Parser)]
pub struct SearchArgs {
    /// Search terms; every term must match.
    #[arg(value_name = "QUERY", default_value = "")]
    pub query: String,

    /// Restrict results to one code type.
    #[arg(long = "type", value_enum, default_value = "all")]
    pub code_type: TypeArg,

    /// Maximum number of results to print.
    #[arg(long = "limit", value_name = "N")]
    pub limit: Option<usize>,
}

#[derive(Parser)]
pub struct SelectArgs {
    /// Codes, procedure category labels or diagnosis codes to toggle, in order.
    #[arg(value_name = "IDENTIFIER")]
    pub identifiers: Vec<String>,

    /// Select every result of this query before toggling.
    #[arg(long = "all-matching", value_name = "QUERY")]
    pub all_matching: Option<String>,

    /// Type filter applied to --all-matching.
    #[arg(long = "type", value_enum, default_value = "all")]
    pub code_type: TypeArg,

    /// Write the selection to this CSV file.
    #[arg(long = "export", value_name = "OUT")]
    pub export: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ImportArgs {
    /// Selection CSV with code_group, code_type and code_value columns.
    #[arg(value_name = "CSV")]
    pub input: PathBuf,

    /// Write the reconciled selection to this CSV file.
    #[arg(long = "export", value_name = "OUT")]
    pub export: Option<PathBuf>,
}

/// Code type choices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TypeArg {
    All,
    Icd10cm,
    Hcpcs,
    Ndc,
}

impl From<TypeArg> for TypeFilter {
    fn from(arg: TypeArg) -> Self {
        match arg {
            TypeArg::All => TypeFilter::All,
            TypeArg::Icd10cm => TypeFilter::Family(CodeFamily::Diagnosis),
            TypeArg::Hcpcs => TypeFilter::Family(CodeFamily::Procedure),
            TypeArg::Ndc => TypeFilter::Family(CodeFamily::DrugProduct),
        }
    }
}
