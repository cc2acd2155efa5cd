//! Selection engine.
//!
//! Owns the selection state of one session: the selected identifiers, their
//! placement in three ordered groups, and the active query and type filter
//! that select-all and import narrowing act on. Every mutation goes through
//! [`SelectionEngine`] and ends with a group synchronization, so
//! `group1 ∪ group2 ∪ group3 == selected` holds between calls, with the
//! groups pairwise disjoint.

use std::collections::HashSet;
use std::io::{Read, Write};
use std::sync::Arc;

use codepick_types::{GroupId, TypeFilter};

use crate::export::write_selection;
use crate::import::parse_import;
use crate::reconcile::Reconciler;
use crate::search::{search, SearchResults};
use crate::store::{CodeStore, SelectTarget};
use crate::types::{CodepickResult, ParseStats, SearchConfig};

/// Checkbox state of an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    /// Nothing selected.
    Unchecked,
    /// Some, but not all, members of a category or subtree selected.
    Partial,
    /// Everything selected.
    Checked,
}

/// Report of an applied import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    /// Row accounting from parsing.
    pub stats: ParseStats,
    /// Number of rows matched to a catalog code.
    pub matched: usize,
    /// Raw values of rows that matched nothing.
    pub unmatched: Vec<String>,
    /// Type filter in effect after the import.
    pub filter: TypeFilter,
}

/// Hierarchical multi-select over a shared code store.
pub struct SelectionEngine {
    store: Arc<CodeStore>,
    config: SearchConfig,
    /// Selected identifiers in selection order.
    selected: Vec<String>,
    /// Membership index over `selected`.
    members: HashSet<String>,
    groups: [Vec<String>; 3],
    query: String,
    filter: TypeFilter,
}

impl std::fmt::Debug for SelectionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionEngine")
            .field("selected", &self.selected.len())
            .field("group1", &self.groups[0].len())
            .field("group2", &self.groups[1].len())
            .field("group3", &self.groups[2].len())
            .field("query", &self.query)
            .field("filter", &self.filter)
            .finish()
    }
}

impl SelectionEngine {
    /// Creates an engine with an empty selection.
    pub fn new(store: Arc<CodeStore>) -> Self {
        Self::with_config(store, SearchConfig::default())
    }

    /// Creates an engine with custom search settings.
    pub fn with_config(store: Arc<CodeStore>, config: SearchConfig) -> Self {
        Self {
            store,
            config,
            selected: Vec::new(),
            members: HashSet::new(),
            groups: Default::default(),
            query: String::new(),
            filter: TypeFilter::All,
        }
    }

    /// Returns the store this engine selects from.
    pub fn store(&self) -> &CodeStore {
        &self.store
    }

    /// Returns the search settings.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    // Toggling

    /// Toggles an identifier.
    ///
    /// - A procedure category label selects all of its members unless they
    ///   are all selected already, in which case it deselects them.
    /// - A diagnosis code with descendants selects or deselects itself and
    ///   every descendant, depending only on whether the code itself is
    ///   selected.
    /// - Anything else flips its own membership, whether or not the catalog
    ///   knows it.
    pub fn toggle(&mut self, identifier: &str) {
        let store = Arc::clone(&self.store);

        match store.resolve(identifier) {
            SelectTarget::Category(cat) => {
                let members = store.category(cat).map(|c| c.members.as_slice()).unwrap_or(&[]);
                let codes = member_codes(&store, members);
                if !codes.is_empty() && codes.iter().all(|c| self.members.contains(*c)) {
                    self.remove_many(&codes);
                } else {
                    self.insert_many(&codes);
                }
            }
            SelectTarget::Subtree(idx) => {
                let codes = member_codes(&store, &store.descendants_or_self(idx));
                if self.members.contains(identifier) {
                    self.remove_many(&codes);
                } else {
                    self.insert_many(&codes);
                }
            }
            SelectTarget::Leaf => {
                if self.members.contains(identifier) {
                    self.remove_many(&[identifier]);
                } else {
                    self.insert(identifier);
                }
            }
        }

        self.sync_groups();
    }

    /// Selects every record in the current filtered results.
    pub fn select_all(&mut self) {
        let store = Arc::clone(&self.store);
        let results = self.results();
        let codes = member_codes(&store, &results.indices);
        self.insert_many(&codes);
        self.sync_groups();
    }

    /// Clears the whole selection, regardless of the current filter.
    pub fn deselect_all(&mut self) {
        self.selected.clear();
        self.members.clear();
        self.sync_groups();
    }

    /// Removes one identifier, leaving its relatives untouched.
    ///
    /// Returns false if it was not selected.
    pub fn remove_code(&mut self, identifier: &str) -> bool {
        if !self.members.contains(identifier) {
            return false;
        }
        self.remove_many(&[identifier]);
        self.sync_groups();
        true
    }

    /// Moves a selected identifier to `index` within `group`.
    ///
    /// The index is clamped to the group's length after the identifier is
    /// taken out of its current position. Returns false, changing nothing,
    /// if the identifier is not selected.
    pub fn move_code(&mut self, identifier: &str, group: GroupId, index: usize) -> bool {
        if !self.members.contains(identifier) {
            return false;
        }

        for codes in &mut self.groups {
            codes.retain(|c| c != identifier);
        }

        let target = &mut self.groups[group.index()];
        let index = index.min(target.len());
        target.insert(index, identifier.to_string());
        true
    }

    /// Brings the groups in line with the selected set.
    ///
    /// Identifiers no longer selected are dropped from every group, and
    /// selected identifiers that are in no group are appended to group 1 in
    /// selection order.
    pub fn sync_groups(&mut self) {
        let members = &self.members;
        for codes in &mut self.groups {
            codes.retain(|c| members.contains(c));
        }

        let placed: HashSet<&str> = self.groups.iter().flatten().map(String::as_str).collect();
        let unplaced: Vec<String> = self
            .selected
            .iter()
            .filter(|c| !placed.contains(c.as_str()))
            .cloned()
            .collect();

        self.groups[GroupId::One.index()].extend(unplaced);
    }

    fn insert(&mut self, identifier: &str) {
        if self.members.insert(identifier.to_string()) {
            self.selected.push(identifier.to_string());
        }
    }

    fn insert_many(&mut self, identifiers: &[&str]) {
        for identifier in identifiers {
            self.insert(identifier);
        }
    }

    fn remove_many(&mut self, identifiers: &[&str]) {
        let before = self.members.len();
        for identifier in identifiers {
            self.members.remove(*identifier);
        }
        if self.members.len() != before {
            let members = &self.members;
            self.selected.retain(|c| members.contains(c));
        }
    }

    // Projections

    /// Returns true if the identifier itself is selected.
    pub fn is_selected(&self, identifier: &str) -> bool {
        self.members.contains(identifier)
    }

    /// Returns the checkbox state of an identifier.
    ///
    /// Categories and subtrees report how many of their members are
    /// selected; anything else is checked or unchecked.
    pub fn check_state(&self, identifier: &str) -> CheckState {
        let store = &self.store;
        let indices = match store.resolve(identifier) {
            SelectTarget::Category(cat) => store
                .category(cat)
                .map(|c| c.members.clone())
                .unwrap_or_default(),
            SelectTarget::Subtree(idx) => store.descendants_or_self(idx),
            SelectTarget::Leaf => {
                return if self.is_selected(identifier) {
                    CheckState::Checked
                } else {
                    CheckState::Unchecked
                };
            }
        };

        let codes = member_codes(store, &indices);
        let selected = codes.iter().filter(|c| self.members.contains(**c)).count();
        match selected {
            0 => CheckState::Unchecked,
            n if n == codes.len() => CheckState::Checked,
            _ => CheckState::Partial,
        }
    }

    /// Returns selected identifiers in selection order.
    pub fn selected_codes(&self) -> &[String] {
        &self.selected
    }

    /// Returns the number of selected identifiers.
    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Returns all three groups.
    pub fn groups(&self) -> &[Vec<String>; 3] {
        &self.groups
    }

    /// Returns one group.
    pub fn group(&self, group: GroupId) -> &[String] {
        &self.groups[group.index()]
    }

    // Query state

    /// Sets the query text.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Returns the query text.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Sets the type filter.
    pub fn set_filter(&mut self, filter: TypeFilter) {
        self.filter = filter;
    }

    /// Returns the type filter.
    pub fn filter(&self) -> TypeFilter {
        self.filter
    }

    /// Runs the current query and type filter.
    pub fn results(&self) -> SearchResults {
        search(&self.store, &self.query, self.filter)
    }

    /// Returns the current results capped at the display limit.
    pub fn displayed_results(&self) -> Vec<usize> {
        self.results().displayed(self.config.display_limit).to_vec()
    }

    // Import and export

    /// Replaces the selection with the contents of an import file.
    ///
    /// The file is parsed completely first; a structural error returns
    /// before any state changes. Matched codes are placed in their rows'
    /// groups in row order, a repeated code keeping its first placement.
    /// The type filter narrows to the family of the matched codes when they
    /// share one and resets to all otherwise. The query text is kept.
    pub fn import_csv<R: Read>(&mut self, reader: R) -> CodepickResult<ImportSummary> {
        let file = parse_import(reader)?;
        let store = Arc::clone(&self.store);
        let outcome = Reconciler::new(&store).reconcile(&file.rows);

        self.selected.clear();
        self.members.clear();
        self.groups = Default::default();

        for matched in &outcome.matched {
            if self.members.insert(matched.code.clone()) {
                self.selected.push(matched.code.clone());
                self.groups[matched.group.index()].push(matched.code.clone());
            }
        }
        self.sync_groups();

        self.filter = outcome
            .single_family()
            .map(TypeFilter::Family)
            .unwrap_or(TypeFilter::All);

        tracing::info!(
            rows = file.stats.total_rows,
            matched = outcome.matched.len(),
            unmatched = outcome.unmatched.len(),
            selected = self.selected.len(),
            filter = %self.filter,
            "imported selection"
        );

        Ok(ImportSummary {
            stats: file.stats,
            matched: outcome.matched.len(),
            unmatched: outcome.unmatched,
            filter: self.filter,
        })
    }

    /// Writes the grouped selection as CSV, returning the number of rows.
    pub fn export_csv<W: Write>(&self, writer: W) -> CodepickResult<usize> {
        write_selection(&self.store, &self.groups, writer)
    }
}

/// Codes of the given record indices, skipping indices outside the store.
fn member_codes<'a>(store: &'a CodeStore, indices: &[usize]) -> Vec<&'a str> {
    indices
        .iter()
        .filter_map(|&idx| store.get(idx))
        .map(|record| record.code.as_str())
        .collect()
}
