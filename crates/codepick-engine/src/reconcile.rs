//! Matching of user-supplied code strings to canonical catalog codes.
//!
//! Imported files come from spreadsheets and billing systems that format
//! codes loosely. Each family has its own ladder of normalizations, tried
//! in order until one hits the catalog.

use codepick_types::{CodeFamily, GroupId};

use crate::import::ImportRow;
use crate::normalize::{
    digits_only, insert_diagnosis_point, reduce_ndc_digits, strip_dots, strip_whitespace,
};
use crate::store::CodeStore;

/// An import row resolved to a catalog code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedCode {
    /// Canonical code as stored in the catalog.
    pub code: String,
    /// Family the code was matched in.
    pub family: CodeFamily,
    /// Group requested by the row.
    pub group: GroupId,
}

/// Outcome of reconciling a batch of import rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Matched rows, in row order.
    pub matched: Vec<MatchedCode>,
    /// Raw values of rows that matched nothing, in row order.
    pub unmatched: Vec<String>,
}

impl Reconciliation {
    /// Returns the family shared by every matched row, if there is exactly one.
    pub fn single_family(&self) -> Option<CodeFamily> {
        let first = self.matched.first()?.family;
        self.matched
            .iter()
            .all(|m| m.family == first)
            .then_some(first)
    }
}

/// Resolves raw code strings against a store.
#[derive(Debug, Clone, Copy)]
pub struct Reconciler<'a> {
    store: &'a CodeStore,
}

impl<'a> Reconciler<'a> {
    /// Creates a reconciler over `store`.
    pub fn new(store: &'a CodeStore) -> Self {
        Self { store }
    }

    /// Finds the canonical code for `raw` within `family`.
    ///
    /// Leading and trailing whitespace is ignored. Returns `None` when no
    /// normalization step finds the code.
    pub fn match_code(&self, family: CodeFamily, raw: &str) -> Option<&'a str> {
        let value = raw.trim();
        if value.is_empty() {
            return None;
        }

        match family {
            CodeFamily::Diagnosis => self.match_diagnosis(value),
            CodeFamily::Procedure => self.match_procedure(value),
            CodeFamily::DrugProduct => self.match_drug(value),
        }
    }

    fn canonical(&self, family: CodeFamily, code: &str) -> Option<&'a str> {
        let store = self.store;
        store
            .find(family, code)
            .and_then(|idx| store.get(idx))
            .map(|record| record.code.as_str())
    }

    fn match_diagnosis(&self, value: &str) -> Option<&'a str> {
        let store = self.store;
        let upper = value.to_ascii_uppercase();
        let variants = [value, upper.as_str()];

        variants
            .iter()
            .find_map(|v| self.canonical(CodeFamily::Diagnosis, v))
            .or_else(|| {
                variants.iter().find_map(|v| {
                    insert_diagnosis_point(v)
                        .and_then(|dotted| self.canonical(CodeFamily::Diagnosis, &dotted))
                })
            })
            .or_else(|| {
                variants.iter().find_map(|v| {
                    store
                        .diagnosis_by_dotless(&strip_dots(v))
                        .map(|record| record.code.as_str())
                })
            })
    }

    fn match_procedure(&self, value: &str) -> Option<&'a str> {
        let compact = strip_whitespace(value);
        [
            value.to_string(),
            compact.clone(),
            value.to_ascii_uppercase(),
            compact.to_ascii_uppercase(),
        ]
        .iter()
        .find_map(|v| self.canonical(CodeFamily::Procedure, v))
    }

    fn match_drug(&self, value: &str) -> Option<&'a str> {
        let store = self.store;
        if let Some(code) = self.canonical(CodeFamily::DrugProduct, value) {
            return Some(code);
        }

        let digits = digits_only(value);
        if digits.is_empty() {
            return None;
        }

        // The padding-zero reduction wins over a raw eleven-digit hit
        reduce_ndc_digits(&digits)
            .and_then(|ten| store.drug_by_digits(&ten))
            .or_else(|| store.drug_by_digits(&digits))
            .map(|record| record.code.as_str())
    }

    /// Reconciles import rows.
    ///
    /// Rows with an unrecognized family token or an unknown code are
    /// reported in [`Reconciliation::unmatched`]; they never stop the batch.
    pub fn reconcile(&self, rows: &[ImportRow]) -> Reconciliation {
        let mut outcome = Reconciliation::default();

        for row in rows {
            let matched = CodeFamily::from_token(&row.family_token)
                .and_then(|family| self.match_code(family, &row.value).map(|code| (family, code)));

            match matched {
                Some((family, code)) => {
                    tracing::debug!(value = %row.value, code, %family, "matched import row");
                    outcome.matched.push(MatchedCode {
                        code: code.to_string(),
                        family,
                        group: row.group,
                    });
                }
                None => {
                    tracing::debug!(
                        value = %row.value,
                        token = %row.family_token,
                        "unmatched import row"
                    );
                    outcome.unmatched.push(row.value.clone());
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codepick_types::{Catalog, DiagnosisNode, DrugCode, ProcedureCode};

    fn make_test_store() -> CodeStore {
        CodeStore::from_catalog(&Catalog {
            diagnoses: vec![
                DiagnosisNode::new("A00", "Cholera").with_children(vec![
                    DiagnosisNode::new("A00.0", "Cholera due to Vibrio cholerae 01, biovar cholerae"),
                    DiagnosisNode::new("A00.9", "Cholera, unspecified"),
                ]),
                DiagnosisNode::new("M25", "Other joint disorder").with_children(vec![
                    DiagnosisNode::new("M25.511", "Pain in right shoulder"),
                ]),
            ],
            procedures: vec![
                ProcedureCode::new("E0100", "Cane", "Durable Medical Equipment"),
                ProcedureCode::new("A4206", "Syringe with needle", "Medical and Surgical Supplies"),
            ],
            drugs: vec![
                DrugCode {
                    code: "0069-2700-30".to_string(),
                    name: "30 TABLET in 1 BOTTLE".to_string(),
                    manufacturer: "Pfizer Laboratories".to_string(),
                    package_size: "30 tablets".to_string(),
                },
                DrugCode {
                    code: "50090-1234-01".to_string(),
                    name: "1 VIAL in 1 CARTON".to_string(),
                    manufacturer: "A-S Medication Solutions".to_string(),
                    package_size: "1 vial".to_string(),
                },
            ],
        })
    }

    fn row(group: GroupId, token: &str, value: &str) -> ImportRow {
        ImportRow {
            group,
            category: None,
            family_token: token.to_string(),
            value: value.to_string(),
            description: None,
        }
    }

    #[test]
    fn test_diagnosis_matching() {
        let store = make_test_store();
        let reconciler = Reconciler::new(&store);

        assert_eq!(reconciler.match_code(CodeFamily::Diagnosis, "A00.0"), Some("A00.0"));
        assert_eq!(reconciler.match_code(CodeFamily::Diagnosis, "A000"), Some("A00.0"));
        assert_eq!(reconciler.match_code(CodeFamily::Diagnosis, " a000 "), Some("A00.0"));
        assert_eq!(reconciler.match_code(CodeFamily::Diagnosis, "M25511"), Some("M25.511"));
        assert_eq!(reconciler.match_code(CodeFamily::Diagnosis, "M2.5511"), Some("M25.511"));
        assert_eq!(reconciler.match_code(CodeFamily::Diagnosis, "A001"), None);
        assert_eq!(reconciler.match_code(CodeFamily::Diagnosis, ""), None);
    }

    #[test]
    fn test_procedure_matching() {
        let store = make_test_store();
        let reconciler = Reconciler::new(&store);

        assert_eq!(reconciler.match_code(CodeFamily::Procedure, "E0100"), Some("E0100"));
        assert_eq!(reconciler.match_code(CodeFamily::Procedure, "E 0100"), Some("E0100"));
        assert_eq!(reconciler.match_code(CodeFamily::Procedure, "a 4206"), Some("A4206"));
        assert_eq!(reconciler.match_code(CodeFamily::Procedure, "A00.0"), None);
    }

    #[test]
    fn test_drug_matching() {
        let store = make_test_store();
        let reconciler = Reconciler::new(&store);

        assert_eq!(
            reconciler.match_code(CodeFamily::DrugProduct, "0069-2700-30"),
            Some("0069-2700-30")
        );
        assert_eq!(
            reconciler.match_code(CodeFamily::DrugProduct, "00069270030"),
            Some("0069-2700-30")
        );
        assert_eq!(
            reconciler.match_code(CodeFamily::DrugProduct, "0069270030"),
            Some("0069-2700-30")
        );
        assert_eq!(
            reconciler.match_code(CodeFamily::DrugProduct, "00069-2700-30"),
            Some("0069-2700-30")
        );
        // Eleven-digit canonical codes match on their raw digits
        assert_eq!(
            reconciler.match_code(CodeFamily::DrugProduct, "50090123401"),
            Some("50090-1234-01")
        );
        assert_eq!(reconciler.match_code(CodeFamily::DrugProduct, "NDC"), None);
    }

    #[test]
    fn test_drug_matching_prefers_reduced_digits() {
        let drug = |code: &str| DrugCode {
            code: code.to_string(),
            name: "30 TABLET in 1 BOTTLE".to_string(),
            manufacturer: "Pfizer Laboratories".to_string(),
            package_size: "30 tablets".to_string(),
        };
        let store = CodeStore::from_catalog(&Catalog {
            diagnoses: vec![],
            procedures: vec![],
            drugs: vec![drug("0069-2700-30"), drug("00069-2700-30")],
        });
        let reconciler = Reconciler::new(&store);

        assert_eq!(
            reconciler.match_code(CodeFamily::DrugProduct, "00069270030"),
            Some("0069-2700-30")
        );
        assert_eq!(
            reconciler.match_code(CodeFamily::DrugProduct, "00069-2700-30"),
            Some("00069-2700-30")
        );
    }

    #[test]
    fn test_reconcile_partial_batch() {
        let store = make_test_store();
        let rows = vec![
            row(GroupId::One, "ICD10", "A000"),
            row(GroupId::Two, "HCPCS", "E0100"),
            row(GroupId::Three, "NDC", "00069270030"),
            row(GroupId::One, "ICD10", "Z99.99"),
            row(GroupId::One, "LOINC", "1234-5"),
        ];

        let outcome = Reconciler::new(&store).reconcile(&rows);

        assert_eq!(outcome.matched.len(), 3);
        assert_eq!(outcome.unmatched, vec!["Z99.99".to_string(), "1234-5".to_string()]);
        assert_eq!(
            outcome.matched[2],
            MatchedCode {
                code: "0069-2700-30".to_string(),
                family: CodeFamily::DrugProduct,
                group: GroupId::Three,
            }
        );
        assert_eq!(outcome.single_family(), None);
    }

    #[test]
    fn test_family_token_spellings() {
        let store = make_test_store();
        let rows = vec![
            row(GroupId::One, "icd-10-cm", "A00.9"),
            row(GroupId::One, "Diagnosis", "M25.511"),
        ];

        let outcome = Reconciler::new(&store).reconcile(&rows);
        assert!(outcome.unmatched.is_empty());
        assert_eq!(outcome.single_family(), Some(CodeFamily::Diagnosis));
    }

    #[test]
    fn test_single_family_empty() {
        assert_eq!(Reconciliation::default().single_family(), None);
    }
}
