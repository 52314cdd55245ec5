use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::resolve::reference_name;

/// A loaded OpenAPI 2.0 document.
///
/// Documents are read-only once parsed; the comparator only ever borrows them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiDocument {
    /// Source file name, when loaded from disk.
    pub filename: Option<String>,
    /// The `swagger` version string (e.g. "2.0").
    pub swagger: String,
    /// The `info.title` field.
    pub title: Option<String>,
    /// The `info.version` field.
    pub api_version: Option<String>,
    /// Route template -> path item, in document order.
    pub paths: IndexMap<String, PathItem>,
    /// Model definitions by name, in document order.
    pub definitions: IndexMap<String, Schema>,
    /// Shared parameters by name (targets of `#/parameters/...`).
    pub parameters: IndexMap<String, ParameterObject>,
}

impl ApiDocument {
    /// Iterate every `(route, method, operation)` in document order.
    pub fn operations(&self) -> impl Iterator<Item = (&str, HttpMethod, &Operation)> {
        self.paths.iter().flat_map(|(route, item)| {
            item.operations()
                .map(move |(method, operation)| (route.as_str(), method, operation))
        })
    }
}

/// HTTP verbs recognised under a path item. Any other key is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    /// Every recognised verb.
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Patch,
        HttpMethod::Trace,
    ];

    /// The lowercase key used in path items.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
            HttpMethod::Trace => "trace",
        }
    }

    /// Parse a path-item key. Keys are case-sensitive, as in the document format.
    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == key)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

/// The operations declared under a single route, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathItem {
    pub operations: IndexMap<HttpMethod, Operation>,
}

impl PathItem {
    pub fn operations(&self) -> impl Iterator<Item = (HttpMethod, &Operation)> {
        self.operations.iter().map(|(method, op)| (*method, op))
    }
}

/// A single operation (route + verb).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Operation {
    /// The `operationId`; operations without one are not compared.
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub tags: Vec<String>,
    /// `None` when the operation has no `parameters` key at all.
    pub parameters: Option<Vec<Parameter>>,
    pub external_docs: Option<ExternalDocs>,
    /// Raw `x-ms-pageable` value. Only its presence is meaningful.
    pub pageable: Option<Value>,
    /// `x-ms-long-running-operation` is literally `true`.
    pub long_running: bool,
    pub long_running_options: Option<LongRunningOptions>,
    /// Status code (or `x-` extension key) -> response.
    pub responses: BTreeMap<String, Response>,
    /// Every other key of the operation object.
    pub extra: BTreeMap<String, Value>,
}

impl Operation {
    pub fn parameter_count(&self) -> usize {
        self.parameters.as_ref().map_or(0, Vec::len)
    }

    pub fn parameters(&self) -> &[Parameter] {
        self.parameters.as_deref().unwrap_or_default()
    }

    /// Response codes with `x-` extension keys filtered out.
    pub fn response_codes(&self) -> Vec<&str> {
        self.responses
            .keys()
            .map(String::as_str)
            .filter(|code| !code.starts_with("x-"))
            .collect()
    }

    /// `final-state-via`, defaulting to `"location"`.
    pub fn final_state_via(&self) -> &str {
        self.long_running_options
            .as_ref()
            .and_then(|o| o.final_state_via.as_deref())
            .unwrap_or("location")
    }

    /// Last path segment of `final-state-schema`, if declared.
    pub fn final_state_schema_name(&self) -> Option<&str> {
        self.long_running_options
            .as_ref()
            .and_then(|o| o.final_state_schema.as_deref())
            .map(reference_name)
    }
}

/// `externalDocs` object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExternalDocs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// `x-ms-long-running-operation-options` object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LongRunningOptions {
    #[serde(rename = "final-state-via", skip_serializing_if = "Option::is_none")]
    pub final_state_via: Option<String>,
    #[serde(rename = "final-state-schema", skip_serializing_if = "Option::is_none")]
    pub final_state_schema: Option<String>,
}

/// An operation parameter: either a `$ref` or declared inline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Parameter {
    Reference {
        #[serde(rename = "$ref")]
        reference: String,
    },
    Inline(ParameterObject),
}

/// An inline parameter declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParameterObject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ParameterObject {
    pub fn is_body(&self) -> bool {
        self.location.as_deref() == Some("body")
    }

    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }
}

/// A response object (possibly a bare `$ref`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Response {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Response {
    /// Name of the definition referenced by `schema.$ref`, if any.
    pub fn schema_name(&self) -> Option<&str> {
        self.schema
            .as_ref()
            .and_then(|s| s.reference.as_deref())
            .map(reference_name)
    }
}

/// A schema: a named definition, a property, or an `allOf` member.
///
/// Fields the comparator inspects are lifted out; everything else is kept
/// verbatim in `extra` so the schema renders back to its source shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schema {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(rename = "allOf", skip_serializing_if = "Option::is_none")]
    pub all_of: Option<Vec<Schema>>,
    #[serde(rename = "x-ms-client-flatten", skip_serializing_if = "Option::is_none")]
    pub client_flatten: Option<bool>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Schema {
    pub fn required(&self) -> &[String] {
        self.required.as_deref().unwrap_or_default()
    }

    pub fn all_of(&self) -> &[Schema] {
        self.all_of.as_deref().unwrap_or_default()
    }

    pub fn properties(&self) -> impl Iterator<Item = (&String, &Schema)> {
        self.properties.iter().flatten()
    }

    pub fn client_flatten(&self) -> bool {
        self.client_flatten.unwrap_or(false)
    }

    /// Replace this schema's `$ref` with the body of `resolved`.
    ///
    /// Sibling keys of the reference survive unless `resolved` declares the
    /// same key, in which case the resolved value wins.
    pub fn substitute_reference(&self, resolved: &Schema) -> Schema {
        let mut extra = self.extra.clone();
        extra.extend(resolved.extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        Schema {
            reference: resolved.reference.clone(),
            properties: resolved.properties.clone().or_else(|| self.properties.clone()),
            required: resolved.required.clone().or_else(|| self.required.clone()),
            all_of: resolved.all_of.clone().or_else(|| self.all_of.clone()),
            client_flatten: resolved.client_flatten.or(self.client_flatten),
            extra,
        }
    }
}
