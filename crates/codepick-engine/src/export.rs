//! Selection export.

use std::io::Write;

use codepick_types::GroupId;
use csv::{QuoteStyle, WriterBuilder};

use crate::import::{CATEGORY_COLUMN, DESC_COLUMN, GROUP_COLUMN, TYPE_COLUMN, VALUE_COLUMN};
use crate::store::CodeStore;
use crate::types::CodepickResult;

/// Header row written at the top of every export.
pub const EXPORT_HEADER: [&str; 5] = [
    GROUP_COLUMN,
    CATEGORY_COLUMN,
    TYPE_COLUMN,
    VALUE_COLUMN,
    DESC_COLUMN,
];

/// Writes grouped selections as CSV, returning the number of data rows.
///
/// Rows follow group order, then position within the group. Every field is
/// quoted. Codes missing from the catalog are written with empty type,
/// category and description.
pub fn write_selection<W: Write>(
    store: &CodeStore,
    groups: &[Vec<String>; 3],
    writer: W,
) -> CodepickResult<usize> {
    let mut csv_writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(writer);

    csv_writer.write_record(EXPORT_HEADER)?;

    let mut rows = 0;
    for (group, codes) in GroupId::ALL.iter().zip(groups.iter()) {
        let number = group.number().to_string();
        for code in codes {
            let record = store.find_any(code);
            let family = record.map(|r| r.family.display_name()).unwrap_or("");
            let category = record.and_then(|r| r.category.as_deref()).unwrap_or("");
            let name = record.map(|r| r.name.as_str()).unwrap_or("");

            csv_writer.write_record([number.as_str(), category, family, code.as_str(), name])?;
            rows += 1;
        }
    }

    csv_writer.flush()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use codepick_types::{Catalog, DiagnosisNode, ProcedureCode};

    fn make_test_store() -> CodeStore {
        CodeStore::from_catalog(&Catalog {
            diagnoses: vec![DiagnosisNode::new("I10", "Essential (primary) hypertension")],
            procedures: vec![ProcedureCode::new("E0100", "Cane, \"adjustable\"", "Durable Medical Equipment")],
            drugs: vec![],
        })
    }

    #[test]
    fn test_write_selection() {
        let store = make_test_store();
        let groups = [
            vec!["I10".to_string()],
            vec![],
            vec!["E0100".to_string(), "UNKNOWN".to_string()],
        ];

        let mut out: Vec<u8> = Vec::new();
        let rows = write_selection(&store, &groups, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(rows, 3);
        assert_eq!(
            lines[0],
            "\"code_group\",\"code_category\",\"code_type\",\"code_value\",\"code_desc\""
        );
        assert_eq!(
            lines[1],
            "\"1\",\"\",\"ICD10\",\"I10\",\"Essential (primary) hypertension\""
        );
        assert_eq!(
            lines[2],
            "\"3\",\"Durable Medical Equipment\",\"HCPCS\",\"E0100\",\"Cane, \"\"adjustable\"\"\""
        );
        assert_eq!(lines[3], "\"3\",\"\",\"\",\"UNKNOWN\",\"\"");
    }

    #[test]
    fn test_write_selection_prefers_diagnosis_family() {
        let store = CodeStore::from_catalog(&Catalog {
            diagnoses: vec![DiagnosisNode::new("E0100", "Shared diagnosis code")],
            procedures: vec![ProcedureCode::new("E0100", "Cane", "Durable Medical Equipment")],
            drugs: vec![],
        });
        let groups = [vec!["E0100".to_string()], vec![], vec![]];

        let mut out: Vec<u8> = Vec::new();
        write_selection(&store, &groups, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            text.lines().nth(1),
            Some("\"1\",\"\",\"ICD10\",\"E0100\",\"Shared diagnosis code\"")
        );
    }

    #[test]
    fn test_write_empty_selection() {
        let store = make_test_store();
        let mut out: Vec<u8> = Vec::new();
        let rows = write_selection(&store, &Default::default(), &mut out).unwrap();

        assert_eq!(rows, 0);
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
    }
}
