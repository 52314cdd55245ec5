//! Top-level comparison pass.

use std::collections::HashSet;

use specdiff_parser::{ApiDocument, Schema};
use specdiff_telemetry::log_comparison_completed;

use crate::common_types::{CommonTypeResolver, NoCommonTypes};
use crate::definitions::compare_named_definition;
use crate::diff::{Diff, Summary};
use crate::operations::compare_paths;

/// Compare two documents without any common-type documents.
///
/// Operation diffs come first, then definition diffs for every definition
/// name present in both documents.
pub fn compare_documents(old: &ApiDocument, new: &ApiDocument) -> Vec<Diff> {
    DocumentComparator::new(old, new).compare()
}

/// A configured comparison between an old and a new document.
pub struct DocumentComparator<'a> {
    old: &'a ApiDocument,
    new: &'a ApiDocument,
    common_types: &'a dyn CommonTypeResolver,
}

impl<'a> DocumentComparator<'a> {
    pub fn new(old: &'a ApiDocument, new: &'a ApiDocument) -> Self {
        Self {
            old,
            new,
            common_types: &NoCommonTypes,
        }
    }

    /// Resolve references into shared documents through `resolver`.
    pub fn with_common_types(mut self, resolver: &'a dyn CommonTypeResolver) -> Self {
        self.common_types = resolver;
        self
    }

    /// Run the comparison.
    ///
    /// Every call starts from a fresh context, so repeated calls return
    /// identical results.
    pub fn compare(&self) -> Vec<Diff> {
        let mut ctx = ComparisonContext::new(self.common_types);

        let mut diffs: Vec<Diff> = compare_paths(&ctx, self.old, self.new)
            .into_iter()
            .map(Diff::from)
            .collect();

        for (name, new_definition) in &self.new.definitions {
            if let Some(old_definition) = self.old.definitions.get(name) {
                diffs.extend(
                    compare_named_definition(
                        &mut ctx,
                        old_definition,
                        self.old,
                        new_definition,
                        self.new,
                        name,
                    )
                    .into_iter()
                    .map(Diff::from),
                );
            }
        }

        let summary = Summary::of(&diffs);
        log_comparison_completed!(
            old = self.old.filename.as_deref().unwrap_or("<memory>"),
            new = self.new.filename.as_deref().unwrap_or("<memory>"),
            errors = summary.errors,
            warnings = summary.warnings,
            "comparison completed"
        );

        diffs
    }
}

/// State owned by a single comparison pass.
pub(crate) struct ComparisonContext<'a> {
    pub(crate) common_types: &'a dyn CommonTypeResolver,
    /// Definition names already compared.
    pub(crate) visited: HashSet<String>,
    /// Common-type definitions currently being expanded.
    pub(crate) expanding: Vec<&'a Schema>,
}

impl<'a> ComparisonContext<'a> {
    pub(crate) fn new(common_types: &'a dyn CommonTypeResolver) -> Self {
        Self {
            common_types,
            visited: HashSet::new(),
            expanding: Vec::new(),
        }
    }
}

/// Order-insensitive equality of two string lists.
pub(crate) fn same_members<S: AsRef<str>>(a: &[S], b: &[S]) -> bool {
    a.len() == b.len()
        && a.iter().all(|x| b.iter().any(|y| y.as_ref() == x.as_ref()))
        && b.iter().all(|y| a.iter().any(|x| x.as_ref() == y.as_ref()))
}
