//! # codepick-types
//!
//! Type definitions for medical code catalogs and code selections.
//!
//! This crate provides plain Rust types for the three code families handled
//! by codepick: ICD-10-CM diagnosis codes (a tree), HCPCS procedure codes
//! (grouped by category) and NDC drug product codes (a flat list), plus the
//! flattened [`CodeRecord`] they are merged into.
//!
//! ## Features
//!
//! - `serde` (default): Enables serialization/deserialization support via serde.
//!   Disable this feature for zero-dependency usage.
//!
//! ## Usage
//!
//! ```rust
//! use codepick_types::{Catalog, CodeFamily, DiagnosisNode, GroupId, ProcedureCode, TypeFilter};
//!
//! let catalog = Catalog {
//!     diagnoses: vec![DiagnosisNode::new("A00", "Cholera")
//!         .with_children(vec![DiagnosisNode::new("A00.9", "Cholera, unspecified")])],
//!     procedures: vec![ProcedureCode::new("E0100", "Cane", "Durable Medical Equipment")],
//!     drugs: vec![],
//! };
//!
//! assert_eq!(catalog.len(), 3);
//! assert_eq!("hcpcs".parse::<TypeFilter>().unwrap(), TypeFilter::Family(CodeFamily::Procedure));
//! assert_eq!(GroupId::parse_lenient("2"), GroupId::Two);
//! ```

#![warn(missing_docs)]

mod catalog;
mod family;
mod group;
mod record;

// Re-export all public types at crate root
pub use catalog::{Catalog, DiagnosisNode, DrugCode, ProcedureCode};
pub use family::{CodeFamily, TypeFilter, TypeFilterParseError};
pub use group::GroupId;
pub use record::CodeRecord;
