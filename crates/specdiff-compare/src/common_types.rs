//! Resolution of references into shared ("common type") documents.
//!
//! A reference such as
//! `../../common-types/resource-management/v5/types.json#/definitions/Resource`
//! points outside the document being compared. The comparator asks a
//! [`CommonTypeResolver`] first and only falls back to the local definition
//! table when the resolver has no answer.

use std::path::{Component, Path};

use specdiff_parser::{parse_document_file, reference_name, ApiDocument, ParameterObject, ParseError, Schema};
use specdiff_telemetry::log_unresolved_reference;

/// Lookup for definitions that live outside the compared documents.
///
/// Implementations must be deterministic and side-effect free. A reference
/// that is not a common type resolves to `None`; resolution never fails.
pub trait CommonTypeResolver {
    /// Resolve a definition reference to its schema and owning document.
    fn resolve_definition(&self, reference: &str) -> Option<(&Schema, &ApiDocument)>;

    /// Resolve a parameter reference.
    fn resolve_parameter(&self, _reference: &str) -> Option<&ParameterObject> {
        None
    }
}

/// Resolver that knows no common types.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCommonTypes;

impl CommonTypeResolver for NoCommonTypes {
    fn resolve_definition(&self, _reference: &str) -> Option<(&Schema, &ApiDocument)> {
        None
    }
}

/// Registry of shared documents, matched against the file part of a reference.
///
/// A reference matches a registered document when its file part, with
/// leading `./` and `../` segments removed, is a component-wise suffix of
/// the path the document was registered under.
#[derive(Debug, Default)]
pub struct CommonTypeRegistry {
    documents: Vec<(Vec<String>, ApiDocument)>,
}

impl CommonTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and register every document in `paths`.
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Self, ParseError> {
        let mut registry = Self::new();
        for path in paths {
            let document = parse_document_file(path.as_ref())?;
            registry.register(path, document);
        }
        Ok(registry)
    }

    /// Register `document` under `path`.
    pub fn register(&mut self, path: impl AsRef<Path>, document: ApiDocument) {
        let key = path
            .as_ref()
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => part.to_str().map(|s| s.to_string()),
                _ => None,
            })
            .collect();
        self.documents.push((key, document));
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Split a reference into the matching document and the JSON pointer.
    fn locate<'r>(&self, reference: &'r str) -> Option<(&ApiDocument, &'r str)> {
        let (file, pointer) = reference.split_once('#')?;
        let wanted: Vec<&str> = file
            .split(['/', '\\'])
            .filter(|part| !matches!(*part, "" | "." | ".."))
            .collect();
        if wanted.is_empty() {
            // Local reference
            return None;
        }

        self.documents
            .iter()
            .find(|(key, _)| {
                key.len() >= wanted.len()
                    && key[key.len() - wanted.len()..]
                        .iter()
                        .zip(&wanted)
                        .all(|(a, b)| a == b)
            })
            .map(|(_, document)| (document, pointer))
    }
}

impl CommonTypeResolver for CommonTypeRegistry {
    fn resolve_definition(&self, reference: &str) -> Option<(&Schema, &ApiDocument)> {
        let (document, pointer) = self.locate(reference)?;
        if !pointer.starts_with("/definitions/") {
            return None;
        }
        let found = document.definitions.get(reference_name(pointer));
        if found.is_none() {
            log_unresolved_reference!(
                reference = %reference,
                "common type definition cannot be found, skipping"
            );
        }
        found.map(|schema| (schema, document))
    }

    fn resolve_parameter(&self, reference: &str) -> Option<&ParameterObject> {
        let (document, pointer) = self.locate(reference)?;
        if !pointer.starts_with("/parameters/") {
            return None;
        }
        document.parameters.get(reference_name(pointer))
    }
}
