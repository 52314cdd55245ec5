//! Diff records produced by a comparison pass.
//!
//! Serialized records use the field names downstream tooling expects
//! (`operationId`, `type`, `parameterName`, `changeType`, ...).

use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Severity of a difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Tolerable change.
    Warning,
    /// Breaking change.
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Warning => "warning",
            Level::Error => "error",
        }
    }

    /// Parse from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "warning" => Some(Self::Warning),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single difference between two documents.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Diff {
    Operation(OperationDiff),
    Definition(DefinitionDiff),
}

impl Diff {
    pub fn level(&self) -> Level {
        match self {
            Diff::Operation(d) => d.level,
            Diff::Definition(d) => d.level,
        }
    }

    pub fn before(&self) -> &Value {
        match self {
            Diff::Operation(d) => &d.before,
            Diff::Definition(d) => &d.before,
        }
    }

    pub fn after(&self) -> &Value {
        match self {
            Diff::Operation(d) => &d.after,
            Diff::Definition(d) => &d.after,
        }
    }

    /// The `type` tag of the record.
    pub fn type_name(&self) -> &'static str {
        match self {
            Diff::Operation(d) => d.change.type_name(),
            Diff::Definition(d) => d.change.type_name(),
        }
    }
}

impl From<OperationDiff> for Diff {
    fn from(diff: OperationDiff) -> Self {
        Diff::Operation(diff)
    }
}

impl From<DefinitionDiff> for Diff {
    fn from(diff: DefinitionDiff) -> Self {
        Diff::Definition(diff)
    }
}

/// A difference found while comparing two operations with the same id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationDiff {
    pub operation_id: String,
    #[serde(flatten)]
    pub change: OperationChange,
    pub before: Value,
    pub after: Value,
    pub level: Level,
}

impl OperationDiff {
    pub fn new(
        operation_id: impl Into<String>,
        change: OperationChange,
        before: impl Serialize,
        after: impl Serialize,
        level: Level,
    ) -> Self {
        Self {
            operation_id: operation_id.into(),
            change,
            before: to_json(before),
            after: to_json(after),
            level,
        }
    }

    pub fn error(
        operation_id: impl Into<String>,
        change: OperationChange,
        before: impl Serialize,
        after: impl Serialize,
    ) -> Self {
        Self::new(operation_id, change, before, after, Level::Error)
    }
}

/// What changed about an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum OperationChange {
    /// Operation present on one side only.
    #[serde(rename = "operationId")]
    OperationId,
    #[serde(rename = "path")]
    Path,
    /// Parameter count.
    #[serde(rename = "parameters")]
    Parameters,
    /// A single parameter (currently only the body parameter).
    #[serde(rename = "parameter")]
    Parameter {
        #[serde(rename = "parameterName")]
        parameter_name: String,
        #[serde(rename = "changeType")]
        change_type: ParameterChange,
    },
    #[serde(rename = "pageable")]
    Pageable,
    #[serde(rename = "longrunning")]
    LongRunning,
    #[serde(rename = "finalstate")]
    FinalState,
    #[serde(rename = "finalresult")]
    FinalResult,
    /// Response code set.
    #[serde(rename = "responses")]
    Responses,
    /// Schema of one response code.
    #[serde(rename = "response")]
    Response,
    #[serde(rename = "tags")]
    Tags,
    #[serde(rename = "summary")]
    Summary,
    #[serde(rename = "externalDocs")]
    ExternalDocs,
}

impl OperationChange {
    pub fn body(change_type: ParameterChange) -> Self {
        OperationChange::Parameter {
            parameter_name: "body".to_string(),
            change_type,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            OperationChange::OperationId => "operationId",
            OperationChange::Path => "path",
            OperationChange::Parameters => "parameters",
            OperationChange::Parameter { .. } => "parameter",
            OperationChange::Pageable => "pageable",
            OperationChange::LongRunning => "longrunning",
            OperationChange::FinalState => "finalstate",
            OperationChange::FinalResult => "finalresult",
            OperationChange::Responses => "responses",
            OperationChange::Response => "response",
            OperationChange::Tags => "tags",
            OperationChange::Summary => "summary",
            OperationChange::ExternalDocs => "externalDocs",
        }
    }
}

/// Which aspect of a parameter changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterChange {
    Presence,
    Required,
    Schema,
}

impl ParameterChange {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterChange::Presence => "presence",
            ParameterChange::Required => "required",
            ParameterChange::Schema => "schema",
        }
    }
}

/// A difference found while comparing two definitions with the same name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefinitionDiff {
    /// Definition name; nested inline schemas use `Model.property`.
    pub name: String,
    #[serde(flatten)]
    pub change: DefinitionChange,
    pub before: Value,
    pub after: Value,
    pub level: Level,
}

impl DefinitionDiff {
    pub fn new(
        name: impl Into<String>,
        change: DefinitionChange,
        before: impl Serialize,
        after: impl Serialize,
        level: Level,
    ) -> Self {
        Self {
            name: name.into(),
            change,
            before: to_json(before),
            after: to_json(after),
            level,
        }
    }
}

/// What changed about a definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum DefinitionChange {
    /// Property name set.
    #[serde(rename = "properties")]
    Properties,
    /// A single shared property.
    #[serde(rename = "property")]
    Property {
        #[serde(rename = "propertyName")]
        property_name: String,
        #[serde(rename = "changeType")]
        change_type: PropertyChange,
    },
    #[serde(rename = "required")]
    Required,
}

impl DefinitionChange {
    pub fn type_name(&self) -> &'static str {
        match self {
            DefinitionChange::Properties => "properties",
            DefinitionChange::Property { .. } => "property",
            DefinitionChange::Required => "required",
        }
    }
}

/// Which aspect of a property changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PropertyChange {
    #[serde(rename = "x-ms-client-flatten")]
    ClientFlatten,
    #[serde(rename = "reference")]
    Reference,
}

impl PropertyChange {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyChange::ClientFlatten => "x-ms-client-flatten",
            PropertyChange::Reference => "reference",
        }
    }
}

/// Error and warning counts over a diff list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
}

impl Summary {
    pub fn of(diffs: &[Diff]) -> Self {
        diffs.iter().fold(Self::default(), |mut acc, d| {
            match d.level() {
                Level::Error => acc.errors += 1,
                Level::Warning => acc.warnings += 1,
            }
            acc
        })
    }

    pub fn total(&self) -> usize {
        self.errors + self.warnings
    }

    /// Whether any diff is at or above `threshold`.
    pub fn reaches(&self, threshold: Level) -> bool {
        match threshold {
            Level::Error => self.errors > 0,
            Level::Warning => self.total() > 0,
        }
    }
}

fn to_json(value: impl Serialize) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}
