//! Diagnosis tree construction from flat code listings.
//!
//! Some ICD-10-CM sources list codes without nesting. The tree is recovered
//! from the codes themselves: a code's parent is the longest shorter code in
//! the listing that it extends.

use std::collections::HashMap;

use codepick_types::DiagnosisNode;

use crate::normalize::{diagnosis_level, strip_dots};

/// Builds a diagnosis forest from `(code, name)` pairs.
///
/// Codes are placed shortest-first. A code's parent is the longest proper
/// prefix of its dotless form, at least three characters long, that is
/// itself in the listing; codes without one become roots. Repeated codes
/// keep their first name. Roots and children are sorted by code, and each
/// node's `level` is set from the code length.
///
/// ```
/// use codepick_engine::build_diagnosis_tree;
///
/// let roots = build_diagnosis_tree(vec![
///     ("A00.1".to_string(), "Cholera due to Vibrio cholerae 01, biovar eltor".to_string()),
///     ("A00".to_string(), "Cholera".to_string()),
///     ("A00.0".to_string(), "Cholera due to Vibrio cholerae 01, biovar cholerae".to_string()),
/// ]);
///
/// assert_eq!(roots.len(), 1);
/// assert_eq!(roots[0].children[0].code, "A00.0");
/// ```
pub fn build_diagnosis_tree<I>(entries: I) -> Vec<DiagnosisNode>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut names: HashMap<String, String> = HashMap::new();
    let mut codes: Vec<String> = Vec::new();
    for (code, name) in entries {
        if !names.contains_key(&code) {
            codes.push(code.clone());
            names.insert(code, name);
        }
    }

    codes.sort_by(|a, b| {
        strip_dots(a)
            .chars()
            .count()
            .cmp(&strip_dots(b).chars().count())
            .then_with(|| a.cmp(b))
    });

    // Dotless form -> position in `codes`
    let mut by_clean: HashMap<String, usize> = HashMap::with_capacity(codes.len());
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); codes.len()];
    let mut roots: Vec<usize> = Vec::new();

    for (idx, code) in codes.iter().enumerate() {
        let clean: Vec<char> = strip_dots(code).chars().collect();

        let parent = (3..clean.len())
            .rev()
            .map(|len| clean[..len].iter().collect::<String>())
            .find_map(|prefix| by_clean.get(&prefix).copied());

        match parent {
            Some(parent_idx) => children[parent_idx].push(idx),
            None => roots.push(idx),
        }

        by_clean
            .entry(clean.into_iter().collect())
            .or_insert(idx);
    }

    let mut forest: Vec<DiagnosisNode> = roots
        .iter()
        .map(|&idx| assemble(idx, &codes, &names, &children))
        .collect();
    forest.sort_by(|a, b| a.code.cmp(&b.code));
    forest
}

fn assemble(
    idx: usize,
    codes: &[String],
    names: &HashMap<String, String>,
    children: &[Vec<usize>],
) -> DiagnosisNode {
    let code = &codes[idx];
    let mut nested: Vec<DiagnosisNode> = children[idx]
        .iter()
        .map(|&child| assemble(child, codes, names, children))
        .collect();
    nested.sort_by(|a, b| a.code.cmp(&b.code));

    DiagnosisNode {
        code: code.clone(),
        name: names.get(code).cloned().unwrap_or_default(),
        level: Some(diagnosis_level(code)),
        children: nested,
    }
}
