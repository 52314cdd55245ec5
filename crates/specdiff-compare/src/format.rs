//! Human- and machine-readable rendering of diff lists.

use std::fmt;

use serde_json::Value;

use crate::diff::{DefinitionChange, DefinitionDiff, Diff, OperationChange, OperationDiff, Summary};

/// Output format for a rendered report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// One pipe-delimited line per diff.
    #[default]
    Text,
    /// Markdown table with a summary line.
    Markdown,
    /// JSON array of diff records.
    Json,
}

impl ReportFormat {
    /// Parse from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(Self::Text),
            "markdown" | "md" => Some(Self::Markdown),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Render `diffs` in this format.
    pub fn render(&self, diffs: &[Diff]) -> Result<String, serde_json::Error> {
        match self {
            ReportFormat::Text => Ok(render_text(diffs)),
            ReportFormat::Markdown => Ok(render_markdown(diffs)),
            ReportFormat::Json => render_json(diffs),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReportFormat::Text => "text",
            ReportFormat::Markdown => "markdown",
            ReportFormat::Json => "json",
        })
    }
}

/// Render one diff as `| type | level | message before -> after |` plus a newline.
///
/// `before` and `after` are written as compact JSON.
pub fn print_diff(diff: &Diff) -> String {
    let message = match diff {
        Diff::Operation(d) => operation_message(d),
        Diff::Definition(d) => definition_message(d),
    };
    format!(
        "| {} | {} | {} {} -> {} |\n",
        diff.type_name(),
        diff.level(),
        message,
        compact(diff.before()),
        compact(diff.after()),
    )
}

/// Every diff on its own line, in order.
pub fn render_text(diffs: &[Diff]) -> String {
    diffs.iter().map(print_diff).collect()
}

/// Markdown table of `diffs` followed by the error and warning counts.
pub fn render_markdown(diffs: &[Diff]) -> String {
    let summary = Summary::of(diffs);
    let mut out = String::from("| Type | Level | Message |\n| --- | --- | --- |\n");
    out.push_str(&render_text(diffs));
    out.push_str(&format!(
        "\n**{} error(s), {} warning(s)**\n",
        summary.errors, summary.warnings
    ));
    out
}

/// Pretty-printed JSON array of `diffs`.
pub fn render_json(diffs: &[Diff]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(diffs)
}

fn operation_message(diff: &OperationDiff) -> String {
    let id = &diff.operation_id;
    match &diff.change {
        OperationChange::OperationId => {
            let side = if diff.after.is_null() { "new" } else { "old" };
            format!("The operationId \"{}\" is missing in {} document:", id, side)
        }
        OperationChange::Path => format!("The path for operation \"{}\" changed:", id),
        OperationChange::Parameters => {
            format!("The number of parameters for operation \"{}\" changed:", id)
        }
        OperationChange::Parameter {
            parameter_name,
            change_type,
        } => format!(
            "The {} of parameter \"{}\" for operation \"{}\" changed:",
            change_type.as_str(),
            parameter_name,
            id
        ),
        OperationChange::Pageable => format!("The pageable for operation \"{}\" changed:", id),
        OperationChange::LongRunning => {
            format!("The long-running status for operation \"{}\" changed:", id)
        }
        OperationChange::FinalState => format!("The final state for operation \"{}\" changed:", id),
        OperationChange::FinalResult => {
            format!("The final result schema for operation \"{}\" changed:", id)
        }
        OperationChange::Responses => {
            format!("The response codes for operation \"{}\" changed:", id)
        }
        OperationChange::Response => {
            format!("The response schema for operation \"{}\" changed:", id)
        }
        OperationChange::Tags => format!("The tags for operation \"{}\" changed:", id),
        OperationChange::Summary => format!("The summary for operation \"{}\" changed:", id),
        OperationChange::ExternalDocs => {
            format!("The external docs for operation \"{}\" changed:", id)
        }
    }
}

fn definition_message(diff: &DefinitionDiff) -> String {
    let name = &diff.name;
    match &diff.change {
        DefinitionChange::Properties => {
            format!("The property names of definition \"{}\" changed:", name)
        }
        DefinitionChange::Property {
            property_name,
            change_type,
        } => format!(
            "The {} of property \"{}\" in definition \"{}\" changed:",
            change_type.as_str(),
            property_name,
            name
        ),
        DefinitionChange::Required => {
            format!("The required properties of definition \"{}\" changed:", name)
        }
    }
}

fn compact(value: &Value) -> String {
    // Display on Value is compact JSON.
    value.to_string()
}
