//! Selection import file parsing.
//!
//! An import file is a comma-separated file with a header row naming the
//! columns `code_group`, `code_category` (optional), `code_type`,
//! `code_value` and `code_desc` (optional), in any order and any case.
//! Fields may be double-quoted, with `""` escaping a quote.

use std::io::Read;

use codepick_types::GroupId;
use csv::{ReaderBuilder, StringRecord};

use crate::parser::locate_column;
use crate::types::{CodepickError, CodepickResult, ParseStats};

/// Header of the group column.
pub const GROUP_COLUMN: &str = "code_group";
/// Header of the optional category column.
pub const CATEGORY_COLUMN: &str = "code_category";
/// Header of the family column.
pub const TYPE_COLUMN: &str = "code_type";
/// Header of the code column.
pub const VALUE_COLUMN: &str = "code_value";
/// Header of the optional description column.
pub const DESC_COLUMN: &str = "code_desc";

/// One data row of an import file, before reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRow {
    /// Target group; unrecognized values fall back to group 1.
    pub group: GroupId,
    /// Informational category text.
    pub category: Option<String>,
    /// Family token as written (`ICD10`, `HCPCS`, `NDC`, ...).
    pub family_token: String,
    /// Code as typed by the user.
    pub value: String,
    /// Optional description text.
    pub description: Option<String>,
}

/// Column positions found in an import header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportColumns {
    /// Position of `code_group`.
    pub group: usize,
    /// Position of `code_category`, if present.
    pub category: Option<usize>,
    /// Position of `code_type`.
    pub family: usize,
    /// Position of `code_value`.
    pub value: usize,
    /// Position of `code_desc`, if present.
    pub description: Option<usize>,
}

impl ImportColumns {
    /// Locates the import columns in a header row.
    ///
    /// # Errors
    /// Returns [`CodepickError::MissingColumn`] for the first required
    /// column that is absent.
    pub fn from_headers(headers: &StringRecord) -> CodepickResult<Self> {
        let required = |name: &str| {
            locate_column(headers, name).ok_or_else(|| CodepickError::MissingColumn {
                column: name.to_string(),
            })
        };

        Ok(Self {
            group: required(GROUP_COLUMN)?,
            category: locate_column(headers, CATEGORY_COLUMN),
            family: required(TYPE_COLUMN)?,
            value: required(VALUE_COLUMN)?,
            description: locate_column(headers, DESC_COLUMN),
        })
    }

    /// Highest position among the recognized columns.
    pub fn max_index(&self) -> usize {
        [
            Some(self.group),
            self.category,
            Some(self.family),
            Some(self.value),
            self.description,
        ]
        .into_iter()
        .flatten()
        .max()
        .unwrap_or(0)
    }

    fn row(&self, record: &StringRecord) -> ImportRow {
        let field = |idx: usize| record.get(idx).unwrap_or("").trim();
        let optional = |idx: Option<usize>| {
            idx.map(field)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        ImportRow {
            group: GroupId::parse_lenient(field(self.group)),
            category: optional(self.category),
            family_token: field(self.family).to_string(),
            value: field(self.value).to_string(),
            description: optional(self.description),
        }
    }
}

/// A structurally valid import file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportFile {
    /// Rows to reconcile, in file order.
    pub rows: Vec<ImportRow>,
    /// Row accounting.
    pub stats: ParseStats,
}

/// Parses an import file.
///
/// The whole input is read before anything is returned, so a structural
/// failure never yields partial rows. Blank lines are ignored. Rows too
/// short to reach every recognized column are dropped and counted in
/// [`ParseStats::dropped_rows`].
///
/// # Errors
/// - [`CodepickError::TooFewLines`] when there is no data row after the header,
/// - [`CodepickError::MissingColumn`] when a required header is absent,
/// - [`CodepickError::Csv`] for malformed quoting or invalid UTF-8.
pub fn parse_import<R: Read>(reader: R) -> CodepickResult<ImportFile> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::None)
        .from_reader(reader);

    let mut lines: Vec<StringRecord> = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        lines.push(record);
    }

    if lines.len() < 2 {
        return Err(CodepickError::TooFewLines { found: lines.len() });
    }

    let columns = ImportColumns::from_headers(&lines[0])?;
    let max_index = columns.max_index();

    let mut file = ImportFile::default();
    for record in &lines[1..] {
        file.stats.total_rows += 1;
        if record.len() <= max_index {
            file.stats.dropped_rows += 1;
            continue;
        }
        file.rows.push(columns.row(record));
    }
    file.stats.accepted_rows = file.rows.len();

    if file.stats.dropped_rows > 0 {
        tracing::warn!(
            dropped = file.stats.dropped_rows,
            "dropped import rows shorter than the header"
        );
    }

    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "code_group,code_category,code_type,code_value,code_desc";

    #[test]
    fn test_parse_basic_file() {
        let data = format!(
            "{HEADER}\n\"2\",\"\",\"ICD10\",\"A00.0\",\"Cholera due to Vibrio cholerae 01, biovar cholerae\"\n1,Supplies,HCPCS,A4206,Syringe\n"
        );
        let file = parse_import(data.as_bytes()).unwrap();

        assert_eq!(file.rows.len(), 2);
        assert_eq!(
            file.rows[0],
            ImportRow {
                group: GroupId::Two,
                category: None,
                family_token: "ICD10".to_string(),
                value: "A00.0".to_string(),
                description: Some("Cholera due to Vibrio cholerae 01, biovar cholerae".to_string()),
            }
        );
        assert_eq!(file.rows[1].category.as_deref(), Some("Supplies"));
        assert_eq!(file.stats.accepted_rows, 2);
    }

    #[test]
    fn test_headers_case_insensitive_any_order() {
        let data = "CODE_VALUE,Code_Type,code_GROUP\n0069-2700-30,NDC,3\n";
        let file = parse_import(data.as_bytes()).unwrap();

        assert_eq!(file.rows[0].value, "0069-2700-30");
        assert_eq!(file.rows[0].family_token, "NDC");
        assert_eq!(file.rows[0].group, GroupId::Three);
        assert_eq!(file.rows[0].description, None);
    }

    #[test]
    fn test_escaped_quotes() {
        let data = format!("{HEADER}\n1,,ICD10,I10,\"\"\"Essential\"\" hypertension\"\n");
        let file = parse_import(data.as_bytes()).unwrap();
        assert_eq!(
            file.rows[0].description.as_deref(),
            Some("\"Essential\" hypertension")
        );
    }

    #[test]
    fn test_unrecognized_group_defaults_to_one() {
        let data = format!("{HEADER}\n9,,ICD10,I10,x\nabc,,ICD10,I11,x\n");
        let file = parse_import(data.as_bytes()).unwrap();
        assert!(file.rows.iter().all(|r| r.group == GroupId::One));
    }

    #[test]
    fn test_short_rows_dropped() {
        let data = format!("{HEADER}\n1,,ICD10,I10,desc\n1,,ICD10,I11\n1,,ICD10\n");
        let file = parse_import(data.as_bytes()).unwrap();

        assert_eq!(file.rows.len(), 1);
        assert_eq!(
            file.stats,
            ParseStats {
                total_rows: 3,
                accepted_rows: 1,
                dropped_rows: 2,
            }
        );
    }

    #[test]
    fn test_too_few_lines() {
        let err = parse_import(format!("{HEADER}\n").as_bytes()).unwrap_err();
        assert!(matches!(err, CodepickError::TooFewLines { found: 1 }));

        let err = parse_import("".as_bytes()).unwrap_err();
        assert!(matches!(err, CodepickError::TooFewLines { found: 0 }));

        let err = parse_import(format!("{HEADER}\n\n\n").as_bytes()).unwrap_err();
        assert!(matches!(err, CodepickError::TooFewLines { found: 1 }));
    }

    #[test]
    fn test_missing_required_header() {
        let data = "code_group,code_type\n1,ICD10\n";
        let err = parse_import(data.as_bytes()).unwrap_err();
        assert!(matches!(err, CodepickError::MissingColumn { column } if column == "code_value"));
    }

    #[test]
    fn test_invalid_utf8_is_an_error() {
        let mut data = b"code_group,code_type,code_value\n1,ICD10,".to_vec();
        data.extend_from_slice(&[0xff, 0xfe, b'\n']);
        let err = parse_import(data.as_slice()).unwrap_err();
        assert!(matches!(err, CodepickError::Csv(_)));
    }
}
