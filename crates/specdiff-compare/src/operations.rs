//! Operation-level comparison.
//!
//! Operations are matched across documents by `operationId`. Every facet of a
//! matched pair is checked independently, so one pair can yield several diffs.

use indexmap::IndexMap;
use specdiff_parser::{local_parameter, ApiDocument, Operation, Parameter, ParameterObject};
use specdiff_telemetry::log_duplicate_operation_id;

use crate::compare::{same_members, ComparisonContext};
use crate::diff::{Level, OperationChange, OperationDiff, ParameterChange};

/// `operationId -> (route, operation)` for one document, in first-seen order.
pub(crate) type OperationIndex<'d> = IndexMap<&'d str, (&'d str, &'d Operation)>;

/// Index the operations of `document` by `operationId`.
///
/// Operations without an id are skipped. When two operations share an id
/// the one later in the document wins; the id keeps its first position.
pub(crate) fn index_operations(document: &ApiDocument) -> OperationIndex<'_> {
    let mut index = OperationIndex::new();
    for (route, method, operation) in document.operations() {
        let Some(id) = operation.operation_id.as_deref() else {
            continue;
        };
        if let Some((previous, _)) = index.insert(id, (route, operation)) {
            log_duplicate_operation_id!(
                operation_id = %id,
                previous_route = %previous,
                route = %route,
                method = %method,
                "operationId declared more than once, keeping the last"
            );
        }
    }
    index
}

/// Compare every operation of both documents.
///
/// Ids from the old document come first (missing ones flagged, shared ones
/// compared facet by facet), then ids only present in the new document.
pub(crate) fn compare_paths(
    ctx: &ComparisonContext<'_>,
    old: &ApiDocument,
    new: &ApiDocument,
) -> Vec<OperationDiff> {
    let old_operations = index_operations(old);
    let new_operations = index_operations(new);

    let mut diffs = Vec::new();
    for (&id, &(old_route, old_operation)) in &old_operations {
        let Some(&(new_route, new_operation)) = new_operations.get(id) else {
            diffs.push(OperationDiff::error(
                id,
                OperationChange::OperationId,
                id,
                None::<&str>,
            ));
            continue;
        };

        if old_route != new_route {
            diffs.push(OperationDiff::error(
                id,
                OperationChange::Path,
                old_route,
                new_route,
            ));
        }
        diffs.extend(compare_operation(
            ctx,
            old_operation,
            old,
            new_operation,
            new,
            id,
        ));
    }

    for &id in new_operations.keys() {
        if !old_operations.contains_key(id) {
            diffs.push(OperationDiff::error(
                id,
                OperationChange::OperationId,
                None::<&str>,
                id,
            ));
        }
    }

    diffs
}

/// Compare two operations sharing `operation_id`.
pub(crate) fn compare_operation(
    ctx: &ComparisonContext<'_>,
    old: &Operation,
    old_document: &ApiDocument,
    new: &Operation,
    new_document: &ApiDocument,
    operation_id: &str,
) -> Vec<OperationDiff> {
    let mut diffs = Vec::new();

    if old.parameter_count() != new.parameter_count() {
        diffs.push(OperationDiff::error(
            operation_id,
            OperationChange::Parameters,
            old.parameter_count(),
            new.parameter_count(),
        ));
    }

    diffs.extend(compare_tags(old, new, operation_id));
    diffs.extend(compare_summary(old, new, operation_id));
    diffs.extend(compare_external_docs(old, new, operation_id));
    diffs.extend(compare_pagination(old, new, operation_id));
    diffs.extend(compare_long_running(old, new, operation_id));
    diffs.extend(compare_responses(old, new, operation_id));
    diffs.extend(compare_body_parameter(
        ctx,
        old,
        old_document,
        new,
        new_document,
        operation_id,
    ));

    diffs
}

fn compare_tags(old: &Operation, new: &Operation, operation_id: &str) -> Option<OperationDiff> {
    (!same_members(&old.tags, &new.tags)).then(|| {
        OperationDiff::error(operation_id, OperationChange::Tags, &old.tags, &new.tags)
    })
}

fn compare_summary(old: &Operation, new: &Operation, operation_id: &str) -> Option<OperationDiff> {
    let old_summary = old.summary.as_deref().unwrap_or("");
    let new_summary = new.summary.as_deref().unwrap_or("");
    (old_summary != new_summary).then(|| {
        OperationDiff::error(operation_id, OperationChange::Summary, old_summary, new_summary)
    })
}

fn compare_external_docs(
    old: &Operation,
    new: &Operation,
    operation_id: &str,
) -> Option<OperationDiff> {
    let changed = match (&old.external_docs, &new.external_docs) {
        (None, None) => false,
        (Some(a), Some(b)) => a.url != b.url || a.description != b.description,
        _ => true,
    };
    changed.then(|| {
        OperationDiff::error(
            operation_id,
            OperationChange::ExternalDocs,
            &old.external_docs,
            &new.external_docs,
        )
    })
}

fn compare_pagination(
    old: &Operation,
    new: &Operation,
    operation_id: &str,
) -> Option<OperationDiff> {
    (old.pageable.is_some() != new.pageable.is_some()).then(|| {
        OperationDiff::error(
            operation_id,
            OperationChange::Pageable,
            &old.pageable,
            &new.pageable,
        )
    })
}

fn compare_long_running(old: &Operation, new: &Operation, operation_id: &str) -> Vec<OperationDiff> {
    let mut diffs = Vec::new();

    if old.long_running != new.long_running {
        diffs.push(OperationDiff::error(
            operation_id,
            OperationChange::LongRunning,
            old.long_running,
            new.long_running,
        ));
    }

    if old.final_state_via() != new.final_state_via() {
        diffs.push(OperationDiff::error(
            operation_id,
            OperationChange::FinalState,
            old.final_state_via(),
            new.final_state_via(),
        ));
    }

    // The new final-state schema must match what the old 200 response returned.
    if old.long_running {
        let old_result = old.responses.get("200").and_then(|r| r.schema_name());
        let new_result = new.final_state_schema_name();
        if old_result != new_result {
            diffs.push(OperationDiff::error(
                operation_id,
                OperationChange::FinalResult,
                old_result,
                new_result,
            ));
        }
    }

    diffs
}

fn compare_responses(old: &Operation, new: &Operation, operation_id: &str) -> Vec<OperationDiff> {
    let mut diffs = Vec::new();

    let old_codes = old.response_codes();
    let new_codes = new.response_codes();
    let same_codes = old_codes.iter().all(|code| new_codes.contains(code))
        && new_codes.iter().all(|code| old_codes.contains(code));
    if !same_codes {
        diffs.push(OperationDiff::error(
            operation_id,
            OperationChange::Responses,
            &old_codes,
            &new_codes,
        ));
    }

    for code in &old_codes {
        let old_response = old.responses.get(*code);
        let new_response = new.responses.get(*code);
        let old_schema = old_response.and_then(|r| r.schema_name());
        let new_schema = new_response.and_then(|r| r.schema_name());
        if old_schema != new_schema {
            diffs.push(OperationDiff::error(
                operation_id,
                OperationChange::Response,
                old_response,
                new_response,
            ));
        }
    }

    diffs
}

fn compare_body_parameter(
    ctx: &ComparisonContext<'_>,
    old: &Operation,
    old_document: &ApiDocument,
    new: &Operation,
    new_document: &ApiDocument,
    operation_id: &str,
) -> Vec<OperationDiff> {
    let mut diffs = Vec::new();

    let old_body = body_parameter(ctx, old, old_document);
    let new_body = body_parameter(ctx, new, new_document);

    let (old_body, new_body) = match (old_body, new_body) {
        (Some(old_body), Some(new_body)) => (old_body, new_body),
        (None, None) => return diffs,
        (old_body, new_body) => {
            let presence = |p: Option<&ParameterObject>| if p.is_some() { "present" } else { "absent" };
            diffs.push(OperationDiff::error(
                operation_id,
                OperationChange::body(ParameterChange::Presence),
                presence(old_body),
                presence(new_body),
            ));
            return diffs;
        }
    };

    if old_body.is_required() != new_body.is_required() {
        diffs.push(OperationDiff::error(
            operation_id,
            OperationChange::body(ParameterChange::Required),
            old_body.is_required(),
            new_body.is_required(),
        ));
    }

    if let (Some(old_schema), Some(new_schema)) = (&old_body.schema, &new_body.schema) {
        match (old_schema.reference.as_deref(), new_schema.reference.as_deref()) {
            (Some(old_ref), Some(new_ref)) => {
                let old_name = specdiff_parser::reference_name(old_ref);
                let new_name = specdiff_parser::reference_name(new_ref);
                if old_name != new_name {
                    diffs.push(OperationDiff::error(
                        operation_id,
                        OperationChange::body(ParameterChange::Schema),
                        old_name,
                        new_name,
                    ));
                }
            }
            (old_ref, new_ref) if old_ref != new_ref => {
                diffs.push(OperationDiff::new(
                    operation_id,
                    OperationChange::body(ParameterChange::Schema),
                    old_ref.unwrap_or("inline schema"),
                    new_ref.unwrap_or("inline schema"),
                    Level::Warning,
                ));
            }
            _ => {}
        }
    }

    diffs
}

/// The first parameter of `operation` that is declared `in: body`.
fn body_parameter<'d>(
    ctx: &ComparisonContext<'d>,
    operation: &'d Operation,
    document: &'d ApiDocument,
) -> Option<&'d ParameterObject> {
    operation.parameters().iter().find_map(|parameter| {
        let resolved = match parameter {
            Parameter::Inline(inline) => Some(inline),
            Parameter::Reference { reference } => ctx
                .common_types
                .resolve_parameter(reference)
                .or_else(|| local_parameter(reference, document)),
        };
        resolved.filter(|p| p.is_body())
    })
}
