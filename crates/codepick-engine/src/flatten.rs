//! Flattening of the three catalog families into one record sequence.

use codepick_types::{Catalog, CodeRecord, DiagnosisNode, DrugCode, ProcedureCode};

/// Flattens a diagnosis forest in pre-order.
///
/// Each node's record immediately precedes its subtree. Levels come from
/// tree depth (roots are level 1) and `parent_code` is the enclosing node's
/// code. Nodes with an empty code are emitted unchanged, with their subtree.
pub fn flatten_diagnoses(roots: &[DiagnosisNode]) -> Vec<CodeRecord> {
    let mut out = Vec::with_capacity(roots.iter().map(DiagnosisNode::node_count).sum());
    for root in roots {
        push_subtree(root, 1, None, &mut out);
    }
    out
}

fn push_subtree(node: &DiagnosisNode, level: u8, parent: Option<&str>, out: &mut Vec<CodeRecord>) {
    out.push(CodeRecord::diagnosis(
        node.code.clone(),
        node.name.clone(),
        level,
        parent,
    ));
    for child in &node.children {
        push_subtree(child, level.saturating_add(1), Some(&node.code), out);
    }
}

/// Converts procedure codes to records, keeping input order.
pub fn flatten_procedures(procedures: &[ProcedureCode]) -> Vec<CodeRecord> {
    procedures
        .iter()
        .map(|p| CodeRecord::procedure(p.code.clone(), p.name.clone(), p.category.clone()))
        .collect()
}

/// Converts drug codes to records, keeping input order.
pub fn flatten_drugs(drugs: &[DrugCode]) -> Vec<CodeRecord> {
    drugs
        .iter()
        .map(|d| {
            CodeRecord::drug(
                d.code.clone(),
                d.name.clone(),
                d.manufacturer.clone(),
                d.package_size.clone(),
            )
        })
        .collect()
}

/// Flattens a whole catalog: diagnoses first, then procedures, then drugs.
///
/// The output depends only on the catalog, so flattening the same catalog
/// twice yields identical sequences.
pub fn flatten_catalog(catalog: &Catalog) -> Vec<CodeRecord> {
    let mut records = flatten_diagnoses(&catalog.diagnoses);
    records.reserve(catalog.procedures.len() + catalog.drugs.len());
    records.extend(flatten_procedures(&catalog.procedures));
    records.extend(flatten_drugs(&catalog.drugs));
    records
}
