//! Code family and type filter enumerations.
//!
//! This module provides the three code families handled by the catalog and
//! the type filter used to narrow search results to one of them.

use std::fmt;
use std::str::FromStr;

/// One of the three code systems held in a catalog.
///
/// # Examples
///
/// ```
/// use codepick_types::CodeFamily;
///
/// assert_eq!(CodeFamily::from_token("ICD-10-CM"), Some(CodeFamily::Diagnosis));
/// assert_eq!(CodeFamily::Procedure.display_name(), "HCPCS");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CodeFamily {
    /// ICD-10-CM diagnosis codes, organized as a tree.
    Diagnosis,
    /// HCPCS procedure codes, grouped by category.
    Procedure,
    /// NDC drug product codes, a flat list.
    DrugProduct,
}

impl CodeFamily {
    /// All families in catalog order.
    pub const ALL: [CodeFamily; 3] = [Self::Diagnosis, Self::Procedure, Self::DrugProduct];

    /// Returns the name written to the `code_type` column on export.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Diagnosis => "ICD10",
            Self::Procedure => "HCPCS",
            Self::DrugProduct => "NDC",
        }
    }

    /// Returns the type filter key for this family.
    pub fn filter_key(self) -> &'static str {
        match self {
            Self::Diagnosis => "icd10cm",
            Self::Procedure => "hcpcs",
            Self::DrugProduct => "ndc",
        }
    }

    /// Recognizes a family from a user-supplied token.
    ///
    /// Matching ignores case as well as `-`, `_`, `.` and whitespace, so
    /// `ICD10`, `icd-10-cm` and `ICD 10` all name the diagnosis family.
    /// Returns `None` for anything unrecognized.
    pub fn from_token(token: &str) -> Option<Self> {
        let key: String = token
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | '.') && !c.is_whitespace())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match key.as_str() {
            "icd10" | "icd10cm" | "icd" | "diagnosis" => Some(Self::Diagnosis),
            "hcpcs" | "procedure" => Some(Self::Procedure),
            "ndc" | "drug" => Some(Self::DrugProduct),
            _ => None,
        }
    }
}

impl fmt::Display for CodeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Narrows search results to one family, or shows all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeFilter {
    /// No narrowing.
    #[default]
    All,
    /// Only records of the given family.
    Family(CodeFamily),
}

impl TypeFilter {
    /// Returns true if a record of `family` passes this filter.
    pub fn matches(self, family: CodeFamily) -> bool {
        match self {
            Self::All => true,
            Self::Family(f) => f == family,
        }
    }

    /// Returns the filter key (`all`, `icd10cm`, `hcpcs` or `ndc`).
    pub fn key(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Family(f) => f.filter_key(),
        }
    }
}

impl From<CodeFamily> for TypeFilter {
    fn from(family: CodeFamily) -> Self {
        Self::Family(family)
    }
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Error returned when a type filter key is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeFilterParseError {
    /// The unrecognized input.
    pub value: String,
}

impl fmt::Display for TypeFilterParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown type filter '{}' (expected all, icd10cm, hcpcs or ndc)",
            self.value
        )
    }
}

impl std::error::Error for TypeFilterParseError {}

impl FromStr for TypeFilter {
    type Err = TypeFilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "icd10cm" => Ok(Self::Family(CodeFamily::Diagnosis)),
            "hcpcs" => Ok(Self::Family(CodeFamily::Procedure)),
            "ndc" => Ok(Self::Family(CodeFamily::DrugProduct)),
            _ => Err(TypeFilterParseError {
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_tokens() {
        assert_eq!(CodeFamily::from_token("ICD10"), Some(CodeFamily::Diagnosis));
        assert_eq!(CodeFamily::from_token("icd-10-cm"), Some(CodeFamily::Diagnosis));
        assert_eq!(CodeFamily::from_token(" ICD 10 "), Some(CodeFamily::Diagnosis));
        assert_eq!(CodeFamily::from_token("Hcpcs"), Some(CodeFamily::Procedure));
        assert_eq!(CodeFamily::from_token("NDC"), Some(CodeFamily::DrugProduct));
        assert_eq!(CodeFamily::from_token("drug"), Some(CodeFamily::DrugProduct));
        assert_eq!(CodeFamily::from_token("CPT"), None);
        assert_eq!(CodeFamily::from_token(""), None);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(CodeFamily::Diagnosis.to_string(), "ICD10");
        assert_eq!(CodeFamily::Procedure.to_string(), "HCPCS");
        assert_eq!(CodeFamily::DrugProduct.to_string(), "NDC");
    }

    #[test]
    fn test_type_filter_parse() {
        assert_eq!("all".parse::<TypeFilter>().unwrap(), TypeFilter::All);
        assert_eq!(
            "ICD10CM".parse::<TypeFilter>().unwrap(),
            TypeFilter::Family(CodeFamily::Diagnosis)
        );
        assert_eq!(
            "ndc".parse::<TypeFilter>().unwrap(),
            TypeFilter::Family(CodeFamily::DrugProduct)
        );
        assert!("icd9".parse::<TypeFilter>().is_err());
    }

    #[test]
    fn test_type_filter_matches() {
        let hcpcs = TypeFilter::from(CodeFamily::Procedure);
        assert!(hcpcs.matches(CodeFamily::Procedure));
        assert!(!hcpcs.matches(CodeFamily::Diagnosis));
        assert!(TypeFilter::All.matches(CodeFamily::DrugProduct));
        assert_eq!(hcpcs.to_string(), "hcpcs");
    }
}
