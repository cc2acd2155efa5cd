//! Text search and type filtering over a code store.

use codepick_types::{CodeFamily, CodeRecord, TypeFilter};

use crate::store::CodeStore;

/// Number of text matches per family, before the type filter is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FamilyCounts {
    /// Matches across all families.
    pub all: usize,
    /// Diagnosis matches.
    pub diagnosis: usize,
    /// Procedure matches.
    pub procedure: usize,
    /// Drug product matches.
    pub drug: usize,
}

impl FamilyCounts {
    /// Returns the count shown for a type filter tab.
    pub fn get(&self, filter: TypeFilter) -> usize {
        match filter {
            TypeFilter::All => self.all,
            TypeFilter::Family(CodeFamily::Diagnosis) => self.diagnosis,
            TypeFilter::Family(CodeFamily::Procedure) => self.procedure,
            TypeFilter::Family(CodeFamily::DrugProduct) => self.drug,
        }
    }

    fn add(&mut self, family: CodeFamily) {
        self.all += 1;
        match family {
            CodeFamily::Diagnosis => self.diagnosis += 1,
            CodeFamily::Procedure => self.procedure += 1,
            CodeFamily::DrugProduct => self.drug += 1,
        }
    }
}

/// Records passing a query and type filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResults {
    /// Matching record indices in flattening order.
    pub indices: Vec<usize>,
    /// Per-family text matches, independent of the type filter.
    pub counts: FamilyCounts,
}

impl SearchResults {
    /// Number of records passing both query and filter.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns true if nothing passed.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The first `limit` matching indices.
    pub fn displayed(&self, limit: usize) -> &[usize] {
        &self.indices[..self.indices.len().min(limit)]
    }

    /// Iterates the matching records.
    pub fn records<'a>(
        &'a self,
        store: &'a CodeStore,
    ) -> impl Iterator<Item = &'a CodeRecord> + 'a {
        self.indices.iter().filter_map(move |&idx| store.get(idx))
    }
}

/// Splits a query into lowercased whitespace-separated terms.
pub fn query_terms(query: &str) -> Vec<String> {
    query.split_whitespace().map(str::to_lowercase).collect()
}

/// Searches the store.
///
/// A record matches when every query term occurs, ignoring case, in its
/// code, name or category text. An empty or blank query matches every
/// record. Results keep flattening order; `counts` tallies text matches per
/// family before `filter` narrows the result list.
pub fn search(store: &CodeStore, query: &str, filter: TypeFilter) -> SearchResults {
    let terms = query_terms(query);
    let mut results = SearchResults::default();

    for (idx, record) in store.records().iter().enumerate() {
        let haystack = store.haystack(idx);
        if !terms.iter().all(|term| haystack.contains(term.as_str())) {
            continue;
        }

        results.counts.add(record.family);
        if filter.matches(record.family) {
            results.indices.push(idx);
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use codepick_types::{Catalog, DiagnosisNode, DrugCode, ProcedureCode};

    fn make_test_store() -> CodeStore {
        CodeStore::from_catalog(&Catalog {
            diagnoses: vec![DiagnosisNode::new("J44", "Other chronic obstructive pulmonary disease")
                .with_children(vec![
                    DiagnosisNode::new("J44.0", "Chronic obstructive pulmonary disease with acute lower respiratory infection"),
                    DiagnosisNode::new("J44.9", "Chronic obstructive pulmonary disease, unspecified"),
                ])],
            procedures: vec![
                ProcedureCode::new("E0424", "Stationary compressed gaseous oxygen system", "Durable Medical Equipment"),
                ProcedureCode::new("J7620", "Albuterol and ipratropium, inhalation solution", "Drugs Administered Other Than Oral Method"),
            ],
            drugs: vec![DrugCode {
                code: "0487-0201-01".to_string(),
                name: "ipratropium bromide and albuterol sulfate inhalation solution".to_string(),
                manufacturer: "Nephron".to_string(),
                package_size: "3 mL".to_string(),
            }],
        })
    }

    #[test]
    fn test_empty_query_matches_all() {
        let store = make_test_store();
        let results = search(&store, "   ", TypeFilter::All);
        assert_eq!(results.len(), store.len());
        assert_eq!(results.indices, (0..store.len()).collect::<Vec<_>>());
        assert_eq!(results.counts.all, 6);
        assert_eq!(results.counts.diagnosis, 3);
    }

    #[test]
    fn test_all_terms_must_match() {
        let store = make_test_store();
        let results = search(&store, "Chronic UNSPECIFIED", TypeFilter::All);
        let codes: Vec<&str> = results.records(&store).map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["J44.9"]);
    }

    #[test]
    fn test_category_text_is_searched() {
        let store = make_test_store();
        let results = search(&store, "durable", TypeFilter::All);
        assert_eq!(results.len(), 1);
        assert_eq!(store.get(results.indices[0]).unwrap().code, "E0424");
    }

    #[test]
    fn test_counts_ignore_type_filter() {
        let store = make_test_store();
        let filter = TypeFilter::Family(CodeFamily::DrugProduct);
        let results = search(&store, "albuterol", filter);

        assert_eq!(results.len(), 1);
        assert_eq!(results.counts.all, 2);
        assert_eq!(results.counts.procedure, 1);
        assert_eq!(results.counts.drug, 1);
        assert_eq!(results.counts.get(filter), 1);
        assert_eq!(results.counts.get(TypeFilter::All), 2);
    }

    #[test]
    fn test_code_search_and_display_cap() {
        let store = make_test_store();
        let results = search(&store, "j44", TypeFilter::All);
        assert_eq!(results.len(), 3);
        assert_eq!(results.displayed(2).len(), 2);
        assert_eq!(results.displayed(10).len(), 3);
    }

    #[test]
    fn test_terms_do_not_span_fields() {
        let store = make_test_store();
        // "J44" followed directly by "Other" only exists if fields were glued together
        assert!(search(&store, "j44other", TypeFilter::All).is_empty());
    }
}
