//! Unified flattened code record.

use crate::CodeFamily;

/// A searchable record produced by flattening one of the three families.
///
/// Diagnosis records carry `level` and `parent_code`, procedure records
/// carry `category`, drug records carry `manufacturer` and `package_size`.
///
/// # Examples
///
/// ```
/// use codepick_types::{CodeFamily, CodeRecord};
///
/// let record = CodeRecord::diagnosis("A00.0", "Cholera due to Vibrio cholerae", 2, Some("A00"));
///
/// assert_eq!(record.family, CodeFamily::Diagnosis);
/// assert_eq!(record.parent_code.as_deref(), Some("A00"));
/// assert!(!record.is_root());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CodeRecord {
    /// Canonical code, unique within its family.
    pub code: String,
    /// Human-readable description.
    pub name: String,
    /// Family this record was flattened from.
    pub family: CodeFamily,
    /// Procedure grouping bucket.
    pub category: Option<String>,
    /// Depth in the diagnosis tree (1 = top category).
    pub level: Option<u8>,
    /// Code of the immediate diagnosis ancestor.
    pub parent_code: Option<String>,
    /// Drug labeler name.
    pub manufacturer: Option<String>,
    /// Drug package size.
    pub package_size: Option<String>,
}

impl CodeRecord {
    /// Creates a diagnosis record.
    pub fn diagnosis(
        code: impl Into<String>,
        name: impl Into<String>,
        level: u8,
        parent_code: Option<&str>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            family: CodeFamily::Diagnosis,
            category: None,
            level: Some(level),
            parent_code: parent_code.map(str::to_string),
            manufacturer: None,
            package_size: None,
        }
    }

    /// Creates a procedure record.
    pub fn procedure(
        code: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            family: CodeFamily::Procedure,
            category: Some(category.into()),
            level: None,
            parent_code: None,
            manufacturer: None,
            package_size: None,
        }
    }

    /// Creates a drug product record.
    pub fn drug(
        code: impl Into<String>,
        name: impl Into<String>,
        manufacturer: impl Into<String>,
        package_size: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            family: CodeFamily::DrugProduct,
            category: None,
            level: None,
            parent_code: None,
            manufacturer: Some(manufacturer.into()),
            package_size: Some(package_size.into()),
        }
    }

    /// Returns true if this record has no parent.
    ///
    /// Only meaningful for diagnosis records; procedure and drug records are
    /// always roots.
    pub fn is_root(&self) -> bool {
        self.parent_code.is_none()
    }

    /// Returns the text a search query is matched against: code, name and
    /// category separated by single spaces, lowercased.
    pub fn search_text(&self) -> String {
        let mut text = String::with_capacity(
            self.code.len() + self.name.len() + self.category.as_ref().map_or(0, String::len) + 2,
        );
        text.push_str(&self.code);
        text.push(' ');
        text.push_str(&self.name);
        text.push(' ');
        if let Some(category) = &self.category {
            text.push_str(category);
        }
        text.to_lowercase()
    }
}
