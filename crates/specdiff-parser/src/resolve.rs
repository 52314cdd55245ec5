//! Local `$ref` resolution.
//!
//! Only same-document pointers are handled here. Pointers into shared
//! documents go through the comparator's common-type resolver first.

use specdiff_telemetry::log_unresolved_reference;

use crate::model::{ApiDocument, ParameterObject, Schema};

/// Last `/`-separated segment of a reference (`#/definitions/Widget` -> `Widget`).
pub fn reference_name(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

/// Look up the definition a reference points at in `document`'s own table.
///
/// Logs a warning and returns `None` when the definition is absent.
pub fn local_definition<'a>(reference: &str, document: &'a ApiDocument) -> Option<&'a Schema> {
    let name = reference_name(reference);
    let found = document.definitions.get(name);
    if found.is_none() {
        log_unresolved_reference!(
            reference = %reference,
            "reference to {} cannot be found, skipping",
            name
        );
    }
    found
}

/// Look up a shared parameter (`#/parameters/...`) in `document`'s own table.
pub fn local_parameter<'a>(
    reference: &str,
    document: &'a ApiDocument,
) -> Option<&'a ParameterObject> {
    let name = reference_name(reference);
    let found = document.parameters.get(name);
    if found.is_none() {
        log_unresolved_reference!(
            reference = %reference,
            "parameter {} cannot be found, skipping",
            name
        );
    }
    found
}
