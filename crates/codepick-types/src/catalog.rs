//! Source catalog datasets.
//!
//! These are the three code families as they are shipped, before
//! flattening: a diagnosis tree, a categorized procedure list and a flat
//! drug product list.

/// A node of the ICD-10-CM diagnosis tree.
///
/// A node whose `code` is missing in the source data deserializes with an
/// empty code and is kept as-is.
///
/// # Examples
///
/// ```
/// use codepick_types::DiagnosisNode;
///
/// let cholera = DiagnosisNode::new("A00", "Cholera").with_children(vec![
///     DiagnosisNode::new("A00.0", "Cholera due to Vibrio cholerae 01, biovar cholerae"),
///     DiagnosisNode::new("A00.9", "Cholera, unspecified"),
/// ]);
///
/// assert_eq!(cholera.node_count(), 3);
/// assert!(!cholera.is_leaf());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiagnosisNode {
    /// Canonical ICD-10-CM code (e.g. `A00.0`).
    #[cfg_attr(feature = "serde", serde(default))]
    pub code: String,
    /// Description of the code.
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    /// Level as recorded in the source data. Informational only; the
    /// flattened level is derived from tree depth.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub level: Option<u8>,
    /// Nested child codes.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Vec::is_empty")
    )]
    pub children: Vec<DiagnosisNode>,
}

impl DiagnosisNode {
    /// Creates a leaf node.
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            level: None,
            children: Vec::new(),
        }
    }

    /// Replaces the children of this node.
    pub fn with_children(mut self, children: Vec<DiagnosisNode>) -> Self {
        self.children = children;
        self
    }

    /// Returns true if this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Counts this node and all of its descendants.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }
}

/// An HCPCS procedure code.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProcedureCode {
    /// Canonical HCPCS code (e.g. `J0129`).
    pub code: String,
    /// Description of the code.
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    /// Grouping bucket, also selectable as a whole.
    #[cfg_attr(feature = "serde", serde(default))]
    pub category: String,
}

impl ProcedureCode {
    /// Creates a procedure code.
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            category: category.into(),
        }
    }
}

/// An NDC drug product package code.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DrugCode {
    /// Canonical NDC code with separators (e.g. `0069-2700-30`).
    pub code: String,
    /// Package description.
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    /// Labeler name.
    #[cfg_attr(feature = "serde", serde(default))]
    pub manufacturer: String,
    /// Short package size (e.g. `28 tablets`).
    #[cfg_attr(feature = "serde", serde(default, rename = "packageSize"))]
    pub package_size: String,
}

/// The three code datasets loaded at startup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Catalog {
    /// Root nodes of the diagnosis tree.
    #[cfg_attr(feature = "serde", serde(default))]
    pub diagnoses: Vec<DiagnosisNode>,
    /// Procedure codes in display order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub procedures: Vec<ProcedureCode>,
    /// Drug codes in display order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub drugs: Vec<DrugCode>,
}

impl Catalog {
    /// Total number of diagnosis nodes across the whole tree.
    pub fn diagnosis_count(&self) -> usize {
        self.diagnoses.iter().map(DiagnosisNode::node_count).sum()
    }

    /// Total number of codes in all three families.
    pub fn len(&self) -> usize {
        self.diagnosis_count() + self.procedures.len() + self.drugs.len()
    }

    /// Returns true if the catalog holds no codes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_count() {
        let tree = DiagnosisNode::new("M25", "Other joint disorder").with_children(vec![
            DiagnosisNode::new("M25.5", "Pain in joint").with_children(vec![
                DiagnosisNode::new("M25.50", "Pain in unspecified joint"),
                DiagnosisNode::new("M25.51", "Pain in shoulder"),
            ]),
        ]);
        assert_eq!(tree.node_count(), 4);
    }

    #[test]
    fn test_catalog_len() {
        let catalog = Catalog {
            diagnoses: vec![DiagnosisNode::new("A00", "Cholera")
                .with_children(vec![DiagnosisNode::new("A00.0", "Cholera 01")])],
            procedures: vec![ProcedureCode::new("A4206", "Syringe", "Supplies")],
            drugs: vec![],
        };
        assert_eq!(catalog.diagnosis_count(), 2);
        assert_eq!(catalog.len(), 3);
        assert!(!catalog.is_empty());
        assert!(Catalog::default().is_empty());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_node_without_code_deserializes() {
        let json = r#"{"name": "orphan", "children": [{"code": "X00.1", "name": "child"}]}"#;
        let node: DiagnosisNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.code, "");
        assert_eq!(node.children[0].code, "X00.1");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_drug_package_size_field_name() {
        let json = r#"{"code": "0069-2700-30", "name": "30 TABLET in 1 BOTTLE",
                       "manufacturer": "Pfizer", "packageSize": "30 TABLET"}"#;
        let drug: DrugCode = serde_json::from_str(json).unwrap();
        assert_eq!(drug.package_size, "30 TABLET");
    }
}
