//! In-memory code store.
//!
//! Holds the flattened record sequence of a catalog together with the
//! indices every other component queries:
//!
//! - per-family code lookup,
//! - diagnosis parent and children adjacency (built once, never re-scanned),
//! - procedure categories and their members,
//! - selection targets, resolving every identifier once to a category,
//!   a diagnosis subtree or a plain leaf,
//! - reverse indices for reconciling loosely formatted codes,
//! - lowercased search text.
//!
//! ```ignore
//! let store = CodeStore::from_catalog(&catalog);
//!
//! match store.resolve("A00") {
//!     SelectTarget::Subtree(idx) => println!("{} codes", store.descendants_or_self(idx).len()),
//!     SelectTarget::Category(cat) => println!("{} members", store.category(cat).members.len()),
//!     SelectTarget::Leaf => println!("single code"),
//! }
//! ```

use std::collections::HashMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use codepick_types::{Catalog, CodeFamily, CodeRecord};

use crate::flatten::flatten_catalog;
use crate::normalize::{digits_only, strip_dots};

/// How the selection engine treats an identifier when it is toggled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectTarget {
    /// A procedure category label; the value is the category index.
    Category(usize),
    /// A diagnosis code with at least one descendant; the value is the
    /// record index.
    Subtree(usize),
    /// Any other identifier, known to the catalog or not.
    Leaf,
}

/// A procedure category and the records filed under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Category label, also usable as a selection identifier.
    pub label: String,
    /// Record indices of member procedures, in catalog order.
    pub members: Vec<usize>,
}

/// In-memory store for a flattened code catalog.
///
/// Immutable once built; share it behind an `Arc` when several sessions
/// use the same catalog.
pub struct CodeStore {
    /// Records in flattening order.
    records: Vec<CodeRecord>,
    /// Code -> first record index, one map per family.
    by_code: [HashMap<String, usize>; 3],
    /// Diagnosis parent record index.
    parents: Vec<Option<usize>>,
    /// Diagnosis child record indices, in catalog order.
    children: Vec<Vec<usize>>,
    /// Procedure categories in first-appearance order.
    categories: Vec<Category>,
    /// Category label -> category index.
    category_by_label: HashMap<String, usize>,
    /// Identifiers that toggle more than themselves.
    targets: HashMap<String, SelectTarget>,
    /// Dotless diagnosis code -> record index.
    diagnosis_by_dotless: HashMap<String, usize>,
    /// Digits-only drug code -> record index.
    drug_by_digits: HashMap<String, usize>,
    /// Lowercased search text per record.
    haystacks: Vec<String>,
}

impl std::fmt::Debug for CodeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeStore")
            .field("records", &self.records.len())
            .field("diagnoses", &self.by_code[0].len())
            .field("procedures", &self.by_code[1].len())
            .field("drugs", &self.by_code[2].len())
            .field("categories", &self.categories.len())
            .field("targets", &self.targets.len())
            .finish()
    }
}

fn slot(family: CodeFamily) -> usize {
    match family {
        CodeFamily::Diagnosis => 0,
        CodeFamily::Procedure => 1,
        CodeFamily::DrugProduct => 2,
    }
}

impl CodeStore {
    /// Flattens a catalog and indexes the result.
    pub fn from_catalog(catalog: &Catalog) -> Self {
        Self::from_records(flatten_catalog(catalog))
    }

    /// Indexes an already flattened record sequence.
    ///
    /// Diagnosis records are expected in pre-order with depth-based levels,
    /// as produced by [`flatten_catalog`].
    pub fn from_records(records: Vec<CodeRecord>) -> Self {
        let len = records.len();
        let mut by_code: [HashMap<String, usize>; 3] = Default::default();
        let mut parents = vec![None; len];
        let mut children = vec![Vec::new(); len];
        let mut categories: Vec<Category> = Vec::new();
        let mut category_by_label: HashMap<String, usize> = HashMap::new();
        let mut diagnosis_by_dotless = HashMap::new();
        let mut drug_by_digits = HashMap::new();

        // Open diagnosis ancestors, one per level
        let mut open: Vec<usize> = Vec::new();

        for (idx, record) in records.iter().enumerate() {
            by_code[slot(record.family)]
                .entry(record.code.clone())
                .or_insert(idx);

            match record.family {
                CodeFamily::Diagnosis => {
                    let level = usize::from(record.level.unwrap_or(1).max(1));
                    open.truncate(level - 1);

                    let parent = match (&record.parent_code, open.last()) {
                        (None, _) => None,
                        (Some(code), Some(&top)) if records[top].code == *code => Some(top),
                        (Some(code), _) => by_code[0].get(code).copied().filter(|&p| p != idx),
                    };
                    if let Some(parent_idx) = parent {
                        parents[idx] = Some(parent_idx);
                        children[parent_idx].push(idx);
                    }
                    open.push(idx);

                    diagnosis_by_dotless
                        .entry(strip_dots(&record.code))
                        .or_insert(idx);
                }
                CodeFamily::Procedure => {
                    if let Some(label) = record.category.as_deref().filter(|l| !l.is_empty()) {
                        let cat = *category_by_label
                            .entry(label.to_string())
                            .or_insert_with(|| {
                                categories.push(Category {
                                    label: label.to_string(),
                                    members: Vec::new(),
                                });
                                categories.len() - 1
                            });
                        categories[cat].members.push(idx);
                    }
                }
                CodeFamily::DrugProduct => {
                    drug_by_digits.entry(digits_only(&record.code)).or_insert(idx);
                }
            }
        }

        let mut targets = HashMap::new();
        for (code, &idx) in &by_code[0] {
            if !children[idx].is_empty() {
                targets.insert(code.clone(), SelectTarget::Subtree(idx));
            }
        }
        // Category labels take precedence over diagnosis codes
        for (cat, category) in categories.iter().enumerate() {
            targets.insert(category.label.clone(), SelectTarget::Category(cat));
        }

        let haystacks = build_haystacks(&records);

        tracing::debug!(
            records = len,
            categories = categories.len(),
            subtrees = targets.len() - categories.len(),
            "built code store"
        );

        Self {
            records,
            by_code,
            parents,
            children,
            categories,
            category_by_label,
            targets,
            diagnosis_by_dotless,
            drug_by_digits,
            haystacks,
        }
    }

    // Query methods

    /// Returns all records in flattening order.
    pub fn records(&self) -> &[CodeRecord] {
        &self.records
    }

    /// Gets a record by index.
    pub fn get(&self, idx: usize) -> Option<&CodeRecord> {
        self.records.get(idx)
    }

    /// Finds the index of a code within a family.
    pub fn find(&self, family: CodeFamily, code: &str) -> Option<usize> {
        self.by_code[slot(family)].get(code).copied()
    }

    /// Returns true if the family contains the exact canonical code.
    pub fn contains(&self, family: CodeFamily, code: &str) -> bool {
        self.by_code[slot(family)].contains_key(code)
    }

    /// Finds a code in any family, checking diagnosis, procedure and drug
    /// codes in that order.
    pub fn find_any(&self, code: &str) -> Option<&CodeRecord> {
        CodeFamily::ALL
            .iter()
            .find_map(|&family| self.find(family, code))
            .map(|idx| &self.records[idx])
    }

    /// Gets the parent record index of a diagnosis record.
    pub fn parent(&self, idx: usize) -> Option<usize> {
        self.parents.get(idx).copied().flatten()
    }

    /// Gets the direct children of a diagnosis record.
    pub fn children(&self, idx: usize) -> &[usize] {
        self.children.get(idx).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns true if the record has at least one child.
    pub fn has_children(&self, idx: usize) -> bool {
        !self.children(idx).is_empty()
    }

    /// Gets a record and all of its descendants, in pre-order.
    pub fn descendants_or_self(&self, idx: usize) -> Vec<usize> {
        if idx >= self.records.len() {
            return Vec::new();
        }

        let mut result = Vec::new();
        let mut stack = vec![idx];
        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.children[current].iter().rev());
        }
        result
    }

    /// Returns all procedure categories in first-appearance order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Gets a category by index.
    pub fn category(&self, cat: usize) -> Option<&Category> {
        self.categories.get(cat)
    }

    /// Gets the member record indices of a category label.
    pub fn category_members(&self, label: &str) -> &[usize] {
        self.category_by_label
            .get(label)
            .map(|&cat| self.categories[cat].members.as_slice())
            .unwrap_or(&[])
    }

    /// Resolves how toggling `identifier` behaves.
    pub fn resolve(&self, identifier: &str) -> SelectTarget {
        self.targets
            .get(identifier)
            .copied()
            .unwrap_or(SelectTarget::Leaf)
    }

    /// Looks up a diagnosis record by its code with all dots removed.
    pub fn diagnosis_by_dotless(&self, dotless: &str) -> Option<&CodeRecord> {
        self.diagnosis_by_dotless
            .get(dotless)
            .map(|&idx| &self.records[idx])
    }

    /// Looks up a drug record by the digits of its code.
    pub fn drug_by_digits(&self, digits: &str) -> Option<&CodeRecord> {
        self.drug_by_digits.get(digits).map(|&idx| &self.records[idx])
    }

    /// Gets the lowercased search text of a record.
    pub fn haystack(&self, idx: usize) -> &str {
        self.haystacks.get(idx).map(String::as_str).unwrap_or("")
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the number of distinct codes in a family.
    pub fn family_count(&self, family: CodeFamily) -> usize {
        self.by_code[slot(family)].len()
    }
}

#[cfg(feature = "parallel")]
fn build_haystacks(records: &[CodeRecord]) -> Vec<String> {
    // Indexed parallel collect keeps record order
    records.par_iter().map(CodeRecord::search_text).collect()
}

#[cfg(not(feature = "parallel"))]
fn build_haystacks(records: &[CodeRecord]) -> Vec<String> {
    records.iter().map(CodeRecord::search_text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use codepick_types::{DiagnosisNode, DrugCode, ProcedureCode};

    fn make_test_catalog() -> Catalog {
        Catalog {
            diagnoses: vec![
                DiagnosisNode::new("A00", "Cholera").with_children(vec![
                    DiagnosisNode::new("A00.0", "Cholera due to Vibrio cholerae 01, biovar cholerae"),
                    DiagnosisNode::new("A00.9", "Cholera, unspecified"),
                ]),
                DiagnosisNode::new("M25", "Other joint disorder").with_children(vec![
                    DiagnosisNode::new("M25.5", "Pain in joint").with_children(vec![
                        DiagnosisNode::new("M25.511", "Pain in right shoulder"),
                        DiagnosisNode::new("M25.512", "Pain in left shoulder"),
                    ]),
                ]),
                DiagnosisNode::new("I10", "Essential (primary) hypertension"),
            ],
            procedures: vec![
                ProcedureCode::new("E0100", "Cane", "Durable Medical Equipment"),
                ProcedureCode::new("A4206", "Syringe with needle", "Medical and Surgical Supplies"),
                ProcedureCode::new("E0105", "Quad cane", "Durable Medical Equipment"),
            ],
            drugs: vec![DrugCode {
                code: "0069-2700-30".to_string(),
                name: "30 TABLET in 1 BOTTLE".to_string(),
                manufacturer: "Pfizer Laboratories".to_string(),
                package_size: "30 tablets".to_string(),
            }],
        }
    }

    #[test]
    fn test_store_lookup() {
        let store = CodeStore::from_catalog(&make_test_catalog());

        assert_eq!(store.len(), 12);
        assert_eq!(store.family_count(CodeFamily::Diagnosis), 8);
        assert_eq!(store.family_count(CodeFamily::Procedure), 3);
        assert_eq!(store.family_count(CodeFamily::DrugProduct), 1);

        let idx = store.find(CodeFamily::Diagnosis, "A00.9").unwrap();
        assert_eq!(store.get(idx).unwrap().name, "Cholera, unspecified");
        assert!(store.find(CodeFamily::Procedure, "A00.9").is_none());
        assert!(store.contains(CodeFamily::DrugProduct, "0069-2700-30"));
        assert_eq!(store.find_any("E0105").unwrap().family, CodeFamily::Procedure);
    }

    #[test]
    fn test_store_hierarchy() {
        let store = CodeStore::from_catalog(&make_test_catalog());

        let m25 = store.find(CodeFamily::Diagnosis, "M25").unwrap();
        let m25_5 = store.find(CodeFamily::Diagnosis, "M25.5").unwrap();
        let m25_511 = store.find(CodeFamily::Diagnosis, "M25.511").unwrap();

        assert_eq!(store.children(m25), &[m25_5]);
        assert_eq!(store.parent(m25_511), Some(m25_5));
        assert_eq!(store.parent(m25), None);

        let subtree: Vec<&str> = store
            .descendants_or_self(m25)
            .into_iter()
            .map(|i| store.get(i).unwrap().code.as_str())
            .collect();
        assert_eq!(subtree, vec!["M25", "M25.5", "M25.511", "M25.512"]);

        let i10 = store.find(CodeFamily::Diagnosis, "I10").unwrap();
        assert_eq!(store.descendants_or_self(i10), vec![i10]);
        assert!(store.descendants_or_self(999).is_empty());
    }

    #[test]
    fn test_store_categories() {
        let store = CodeStore::from_catalog(&make_test_catalog());

        let labels: Vec<&str> = store.categories().iter().map(|c| c.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Durable Medical Equipment", "Medical and Surgical Supplies"]
        );
        assert_eq!(store.category_members("Durable Medical Equipment").len(), 2);
        assert!(store.category_members("Vision Services").is_empty());
    }

    #[test]
    fn test_resolve_targets() {
        let store = CodeStore::from_catalog(&make_test_catalog());

        assert_eq!(
            store.resolve("Durable Medical Equipment"),
            SelectTarget::Category(0)
        );
        let a00 = store.find(CodeFamily::Diagnosis, "A00").unwrap();
        assert_eq!(store.resolve("A00"), SelectTarget::Subtree(a00));
        assert_eq!(store.resolve("A00.0"), SelectTarget::Leaf);
        assert_eq!(store.resolve("I10"), SelectTarget::Leaf);
        assert_eq!(store.resolve("E0100"), SelectTarget::Leaf);
        assert_eq!(store.resolve("not-a-code"), SelectTarget::Leaf);
    }

    #[test]
    fn test_category_label_wins_over_diagnosis_code() {
        let catalog = Catalog {
            diagnoses: vec![DiagnosisNode::new("X00", "Clash")
                .with_children(vec![DiagnosisNode::new("X00.1", "Child")])],
            procedures: vec![ProcedureCode::new("Q0001", "Member", "X00")],
            drugs: vec![],
        };
        let store = CodeStore::from_catalog(&catalog);
        assert_eq!(store.resolve("X00"), SelectTarget::Category(0));
    }

    #[test]
    fn test_reverse_indices() {
        let store = CodeStore::from_catalog(&make_test_catalog());

        assert_eq!(store.diagnosis_by_dotless("M25511").unwrap().code, "M25.511");
        assert_eq!(store.drug_by_digits("0069270030").unwrap().code, "0069-2700-30");
        assert!(store.drug_by_digits("00069270030").is_none());
    }

    #[test]
    fn test_haystacks_follow_record_order() {
        let store = CodeStore::from_catalog(&make_test_catalog());
        for (idx, record) in store.records().iter().enumerate() {
            assert_eq!(store.haystack(idx), record.search_text());
        }
        assert_eq!(store.haystack(store.len()), "");
    }
}
