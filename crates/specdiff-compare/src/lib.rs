//! Comparator for OpenAPI 2.0 documents.
//!
//! Given an old and a new [`ApiDocument`], [`compare_documents`] produces an
//! ordered list of [`Diff`] records describing every operation-level and
//! definition-level difference, each tagged with a [`Level`]. The output is
//! data, never an error: unresolvable references are logged and skipped.
//!
//! # Example
//!
//! ```ignore
//! use specdiff_compare::{compare_documents, print_diff};
//! use specdiff_parser::parse_document_file;
//!
//! let old = parse_document_file(Path::new("old.json"))?;
//! let new = parse_document_file(Path::new("new.json"))?;
//! for diff in compare_documents(&old, &new) {
//!     print!("{}", print_diff(&diff));
//! }
//! ```
//!
//! [`ApiDocument`]: specdiff_parser::ApiDocument

pub mod common_types;
mod compare;
mod definitions;
pub mod diff;
pub mod format;
mod operations;

pub use common_types::{CommonTypeRegistry, CommonTypeResolver, NoCommonTypes};
pub use compare::{compare_documents, DocumentComparator};
pub use diff::{
    DefinitionChange, DefinitionDiff, Diff, Level, OperationChange, OperationDiff,
    ParameterChange, PropertyChange, Summary,
};
pub use format::{print_diff, render_json, render_markdown, render_text, ReportFormat};
