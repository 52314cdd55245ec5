//! Definition-level comparison.
//!
//! Definitions are compared by their flattened property set: `allOf` bases
//! are merged in first, then the definition's own properties. Shared
//! properties are compared by reference, or recursively when both sides
//! declare them inline.

use std::borrow::Cow;
use std::collections::BTreeMap;

use specdiff_parser::{local_definition, ApiDocument, Schema};
use specdiff_telemetry::{log_allof_cycle, log_definition_revisited};

use crate::common_types::CommonTypeResolver;
use crate::compare::{same_members, ComparisonContext};
use crate::diff::{DefinitionChange, DefinitionDiff, Level, PropertyChange};

/// Property added by newer resource-management base types. Its sole addition
/// is tolerated as a warning.
const SYSTEM_DATA: &str = "systemData";

/// Compare two definitions that share `name`.
///
/// A name is compared at most once per comparison pass; later visits return
/// no diffs.
pub(crate) fn compare_named_definition(
    ctx: &mut ComparisonContext<'_>,
    old: &Schema,
    old_document: &ApiDocument,
    new: &Schema,
    new_document: &ApiDocument,
    name: &str,
) -> Vec<DefinitionDiff> {
    if !ctx.visited.insert(name.to_string()) {
        log_definition_revisited!(
            definition = %name,
            "definition has been compared before, skipping"
        );
        return Vec::new();
    }

    let mut diffs = Vec::new();

    if !same_members(old.required(), new.required()) {
        diffs.push(DefinitionDiff::new(
            name,
            DefinitionChange::Required,
            old.required(),
            new.required(),
            Level::Warning,
        ));
    }

    let old_properties = all_properties(ctx.common_types, old, old_document);
    let new_properties = all_properties(ctx.common_types, new, new_document);

    // BTreeMap keys are already sorted.
    let old_keys: Vec<&str> = old_properties.keys().map(String::as_str).collect();
    let new_keys: Vec<&str> = new_properties.keys().map(String::as_str).collect();
    let added: Vec<&str> = new_keys
        .iter()
        .copied()
        .filter(|key| !old_properties.contains_key(*key))
        .collect();
    let only_system_data_added = added == [SYSTEM_DATA];

    let properties_diff = |level| {
        DefinitionDiff::new(
            name,
            DefinitionChange::Properties,
            &old_keys,
            &new_keys,
            level,
        )
    };

    if old_keys.len() != new_keys.len() {
        let level = if new_keys.len() == old_keys.len() + 1 && only_system_data_added {
            Level::Warning
        } else {
            Level::Error
        };
        diffs.push(properties_diff(level));
    }
    for key in &old_keys {
        if !new_properties.contains_key(*key) {
            diffs.push(properties_diff(Level::Error));
        }
    }
    for _ in &added {
        let level = if only_system_data_added {
            Level::Warning
        } else {
            Level::Error
        };
        diffs.push(properties_diff(level));
    }

    for (key, old_property) in &old_properties {
        if let Some(new_property) = new_properties.get(key) {
            diffs.extend(compare_property(
                ctx,
                old_property,
                old_document,
                new_property,
                new_document,
                key,
                name,
            ));
        }
    }

    diffs
}

fn compare_property(
    ctx: &mut ComparisonContext<'_>,
    old: &Schema,
    old_document: &ApiDocument,
    new: &Schema,
    new_document: &ApiDocument,
    property_name: &str,
    model_name: &str,
) -> Vec<DefinitionDiff> {
    let mut diffs = Vec::new();

    if old.client_flatten() != new.client_flatten() {
        diffs.push(DefinitionDiff::new(
            model_name,
            DefinitionChange::Property {
                property_name: property_name.to_string(),
                change_type: PropertyChange::ClientFlatten,
            },
            old.client_flatten(),
            new.client_flatten(),
            Level::Error,
        ));
    }

    let resolver = ctx.common_types;
    let old_resolved = resolve_common_type(resolver, &ctx.expanding, old, old_document);
    let new_resolved = resolve_common_type(resolver, &ctx.expanding, new, new_document);

    match (
        old_resolved.schema.reference.as_deref(),
        new_resolved.schema.reference.as_deref(),
    ) {
        (Some(old_ref), Some(new_ref)) => {
            if old_ref != new_ref {
                diffs.push(DefinitionDiff::new(
                    model_name,
                    DefinitionChange::Property {
                        property_name: property_name.to_string(),
                        change_type: PropertyChange::Reference,
                    },
                    old_ref,
                    new_ref,
                    Level::Warning,
                ));
            }
        }
        (None, None) => {
            let depth = ctx.expanding.len();
            ctx.expanding.extend(old_resolved.expanded);
            ctx.expanding.extend(new_resolved.expanded);

            diffs.extend(compare_named_definition(
                ctx,
                &old_resolved.schema,
                old_resolved.document,
                &new_resolved.schema,
                new_resolved.document,
                &format!("{}.{}", model_name, property_name),
            ));

            ctx.expanding.truncate(depth);
        }
        // A reference on one side and an inline schema on the other is not reported.
        _ => {}
    }

    diffs
}

/// A property schema after common-type substitution.
struct ResolvedProperty<'s, 'a> {
    schema: Cow<'s, Schema>,
    /// Document that local references inside `schema` resolve against.
    document: &'s ApiDocument,
    /// The common-type definition that was substituted, if any.
    expanded: Option<&'a Schema>,
}

/// Replace a common-type reference with the definition it points at.
///
/// Local references, unknown references and definitions already being
/// expanded further up the comparison are returned unchanged.
fn resolve_common_type<'s, 'a: 's>(
    resolver: &'a dyn CommonTypeResolver,
    expanding: &[&'a Schema],
    property: &'s Schema,
    document: &'s ApiDocument,
) -> ResolvedProperty<'s, 'a> {
    let unchanged = ResolvedProperty {
        schema: Cow::Borrowed(property),
        document,
        expanded: None,
    };

    let Some(reference) = property.reference.as_deref() else {
        return unchanged;
    };

    match resolver.resolve_definition(reference) {
        Some((body, _)) if expanding.iter().any(|e| std::ptr::eq(*e, body)) => unchanged,
        Some((body, owner)) => ResolvedProperty {
            schema: Cow::Owned(property.substitute_reference(body)),
            document: owner,
            expanded: Some(body),
        },
        None => unchanged,
    }
}

/// Every property of `schema`, including those inherited through `allOf`.
pub(crate) fn all_properties<'s>(
    resolver: &'s dyn CommonTypeResolver,
    schema: &'s Schema,
    document: &'s ApiDocument,
) -> BTreeMap<String, &'s Schema> {
    let mut properties = BTreeMap::new();
    let mut in_progress = vec![schema];
    collect_properties(resolver, schema, document, &mut properties, &mut in_progress);
    properties
}

/// `in_progress` holds the definitions on the current `allOf` chain. They are
/// compared by identity, since the same pointer text names a different
/// definition in each document.
fn collect_properties<'s>(
    resolver: &'s dyn CommonTypeResolver,
    schema: &'s Schema,
    document: &'s ApiDocument,
    properties: &mut BTreeMap<String, &'s Schema>,
    in_progress: &mut Vec<&'s Schema>,
) {
    for base in schema.all_of() {
        let Some(reference) = base.reference.as_deref() else {
            // Inline bases contribute their own properties only.
            for (key, property) in base.properties() {
                properties.insert(key.clone(), property);
            }
            continue;
        };

        let target = resolver
            .resolve_definition(reference)
            .or_else(|| local_definition(reference, document).map(|s| (s, document)));
        let Some((base_schema, base_document)) = target else {
            continue;
        };

        if in_progress.iter().any(|s| std::ptr::eq(*s, base_schema)) {
            log_allof_cycle!(
                reference = %reference,
                "allOf chain refers back to itself, skipping"
            );
            continue;
        }

        in_progress.push(base_schema);
        collect_properties(resolver, base_schema, base_document, properties, in_progress);
        in_progress.pop();
    }

    for (key, property) in schema.properties() {
        properties.insert(key.clone(), property);
    }
}
