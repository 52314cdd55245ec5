use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use specdiff_telemetry::log_malformed_entry;

use crate::error::ParseError;
use crate::model::{
    ApiDocument, ExternalDocs, HttpMethod, LongRunningOptions, Operation, Parameter,
    ParameterObject, PathItem, Response, Schema,
};

/// Parse an OpenAPI 2.0 document from a YAML/JSON string.
pub fn parse_document(input: &str) -> Result<ApiDocument, ParseError> {
    // Parse YAML (also handles JSON since JSON is valid YAML)
    let root: Value =
        serde_yaml::from_str(input).map_err(|e| ParseError::ParseError(e.to_string()))?;

    let root_obj = root
        .as_object()
        .ok_or_else(|| ParseError::ParseError("document root must be an object".into()))?;

    let swagger = detect_version(root_obj)?;

    let info = root_obj.get("info").and_then(|v| v.as_object());
    let title = info
        .and_then(|i| i.get("title"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());
    let api_version = info
        .and_then(|i| i.get("version"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());

    let paths = parse_paths(root_obj)?;

    let definitions = root_obj
        .get("definitions")
        .and_then(|v| v.as_object())
        .map(|defs| {
            defs.iter()
                .map(|(name, schema)| (name.clone(), parse_schema(schema)))
                .collect()
        })
        .unwrap_or_default();

    let parameters = root_obj
        .get("parameters")
        .and_then(|v| v.as_object())
        .map(|params| {
            params
                .iter()
                .filter_map(|(name, param)| {
                    Some((name.clone(), parse_parameter_object(param.as_object()?)))
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(ApiDocument {
        filename: None,
        swagger,
        title,
        api_version,
        paths,
        definitions,
        parameters,
    })
}

/// Parse a document from a file path.
pub fn parse_document_file(path: &std::path::Path) -> Result<ApiDocument, ParseError> {
    let content = std::fs::read_to_string(path)?;
    let mut document = parse_document(&content)?;
    document.filename = path
        .file_name()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string());
    Ok(document)
}

/// Check the root `swagger` field and return its version string.
fn detect_version(root: &Map<String, Value>) -> Result<String, ParseError> {
    if let Some(version) = root.get("swagger").and_then(|v| v.as_str()) {
        if !version.starts_with("2.") {
            return Err(ParseError::SchemaError(format!(
                "unsupported swagger version: {} (only 2.x supported)",
                version
            )));
        }
        Ok(version.to_string())
    } else if let Some(version) = root.get("openapi").and_then(|v| v.as_str()) {
        Err(ParseError::SchemaError(format!(
            "unsupported OpenAPI version: {} (only 2.0 documents can be compared)",
            version
        )))
    } else {
        Err(ParseError::UnknownFormat)
    }
}

fn parse_paths(root: &Map<String, Value>) -> Result<IndexMap<String, PathItem>, ParseError> {
    let mut paths = IndexMap::new();

    let paths_obj = match root.get("paths").and_then(|v| v.as_object()) {
        Some(p) => p,
        None => return Ok(paths), // No paths is valid (definitions-only document)
    };

    for (route, path_item) in paths_obj {
        let Some(path_obj) = path_item.as_object() else {
            log_malformed_entry!(route = %route, "path item is not an object, skipping");
            continue;
        };

        let mut operations = IndexMap::new();
        for (key, op_value) in path_obj {
            // Path-level `parameters`, `$ref` and extensions are not operations
            let Some(method) = HttpMethod::parse(key) else {
                continue;
            };
            let Some(op_obj) = op_value.as_object() else {
                log_malformed_entry!(
                    route = %route,
                    method = %method,
                    "operation is not an object, skipping"
                );
                continue;
            };
            operations.insert(method, parse_operation(op_obj));
        }

        paths.insert(route.clone(), PathItem { operations });
    }

    Ok(paths)
}

fn parse_operation(obj: &Map<String, Value>) -> Operation {
    let mut operation = Operation::default();

    for (key, value) in obj {
        match key.as_str() {
            "operationId" => operation.operation_id = value.as_str().map(|s| s.to_string()),
            "summary" => operation.summary = value.as_str().map(|s| s.to_string()),
            "tags" => operation.tags = string_list(value),
            "parameters" => {
                operation.parameters = value
                    .as_array()
                    .map(|arr| arr.iter().filter_map(parse_parameter).collect())
            }
            "externalDocs" => operation.external_docs = value.as_object().map(parse_external_docs),
            "x-ms-pageable" => operation.pageable = Some(value.clone()),
            "x-ms-long-running-operation" => {
                operation.long_running = value.as_bool() == Some(true)
            }
            "x-ms-long-running-operation-options" => {
                operation.long_running_options = value.as_object().map(|o| LongRunningOptions {
                    final_state_via: o
                        .get("final-state-via")
                        .and_then(|v| v.as_str())
                        .map(|s| s.to_string()),
                    final_state_schema: o
                        .get("final-state-schema")
                        .and_then(|v| v.as_str())
                        .map(|s| s.to_string()),
                })
            }
            "responses" => operation.responses = parse_responses(value),
            _ => {
                operation.extra.insert(key.clone(), value.clone());
            }
        }
    }

    operation
}

fn parse_parameter(value: &Value) -> Option<Parameter> {
    let obj = value.as_object()?;
    if let Some(reference) = obj.get("$ref").and_then(|v| v.as_str()) {
        return Some(Parameter::Reference {
            reference: reference.to_string(),
        });
    }
    Some(Parameter::Inline(parse_parameter_object(obj)))
}

fn parse_parameter_object(obj: &Map<String, Value>) -> ParameterObject {
    let mut param = ParameterObject::default();
    for (key, value) in obj {
        match (key.as_str(), value) {
            ("name", Value::String(s)) => param.name = Some(s.clone()),
            ("in", Value::String(s)) => param.location = Some(s.clone()),
            ("required", Value::Bool(b)) => param.required = Some(*b),
            ("schema", v) if v.is_object() => param.schema = Some(parse_schema(v)),
            _ => {
                param.extra.insert(key.clone(), value.clone());
            }
        }
    }
    param
}

fn parse_external_docs(obj: &Map<String, Value>) -> ExternalDocs {
    ExternalDocs {
        url: obj.get("url").and_then(|v| v.as_str()).map(|s| s.to_string()),
        description: obj
            .get("description")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()),
    }
}

fn parse_responses(value: &Value) -> BTreeMap<String, Response> {
    let Some(obj) = value.as_object() else {
        return BTreeMap::new();
    };

    obj.iter()
        .map(|(code, response)| {
            let response = match response.as_object() {
                Some(r) => parse_response(r),
                // Non-object extension values still occupy a key
                None => Response::default(),
            };
            (code.clone(), response)
        })
        .collect()
}

fn parse_response(obj: &Map<String, Value>) -> Response {
    let mut response = Response::default();
    for (key, value) in obj {
        match (key.as_str(), value) {
            ("$ref", Value::String(s)) => response.reference = Some(s.clone()),
            ("description", Value::String(s)) => response.description = Some(s.clone()),
            ("schema", v) if v.is_object() => response.schema = Some(parse_schema(v)),
            _ => {
                response.extra.insert(key.clone(), value.clone());
            }
        }
    }
    response
}

/// Parse a schema object. Unexpected shapes are kept verbatim in `extra`.
pub(crate) fn parse_schema(value: &Value) -> Schema {
    let mut schema = Schema::default();
    let Some(obj) = value.as_object() else {
        return schema;
    };

    for (key, value) in obj {
        match (key.as_str(), value) {
            ("$ref", Value::String(s)) => schema.reference = Some(s.clone()),
            ("properties", Value::Object(props)) => {
                schema.properties = Some(
                    props
                        .iter()
                        .map(|(name, prop)| (name.clone(), parse_schema(prop)))
                        .collect(),
                )
            }
            ("required", Value::Array(_)) => schema.required = Some(string_list(value)),
            ("allOf", Value::Array(items)) => {
                schema.all_of = Some(items.iter().map(parse_schema).collect())
            }
            ("x-ms-client-flatten", Value::Bool(b)) => schema.client_flatten = Some(*b),
            _ => {
                schema.extra.insert(key.clone(), value.clone());
            }
        }
    }

    schema
}

fn string_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str())
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_document() {
        let yaml = r##"
swagger: "2.0"
info:
  title: Widget Service
  version: "2024-01-01"
paths:
  /widgets/{name}:
    get:
      operationId: Widgets_Get
      summary: Get a widget
      tags: [Widgets]
      responses:
        "200":
          description: OK
          schema:
            $ref: "#/definitions/Widget"
definitions:
  Widget:
    type: object
    properties:
      name:
        type: string
"##;
        let doc = parse_document(yaml).unwrap();
        assert_eq!(doc.swagger, "2.0");
        assert_eq!(doc.title.as_deref(), Some("Widget Service"));
        assert_eq!(doc.api_version.as_deref(), Some("2024-01-01"));

        let item = &doc.paths["/widgets/{name}"];
        let op = &item.operations[&HttpMethod::Get];
        assert_eq!(op.operation_id.as_deref(), Some("Widgets_Get"));
        assert_eq!(op.summary.as_deref(), Some("Get a widget"));
        assert_eq!(op.tags, vec!["Widgets".to_string()]);
        assert_eq!(op.responses["200"].schema_name(), Some("Widget"));

        let widget = &doc.definitions["Widget"];
        assert_eq!(widget.properties().count(), 1);
        assert_eq!(widget.extra["type"], "object");
    }

    #[test]
    fn ignores_non_verb_path_item_keys() {
        let yaml = r##"
swagger: "2.0"
paths:
  /things:
    parameters:
      - name: id
        in: query
        type: string
    x-ms-extension: true
    post:
      operationId: Things_Create
"##;
        let doc = parse_document(yaml).unwrap();
        let item = &doc.paths["/things"];
        assert_eq!(item.operations.len(), 1);
        assert!(item.operations.contains_key(&HttpMethod::Post));
    }

    #[test]
    fn parse_parameters_refs_and_inline() {
        let yaml = r##"
swagger: "2.0"
paths:
  /things:
    put:
      operationId: Things_Put
      parameters:
        - $ref: "#/parameters/ApiVersion"
        - name: body
          in: body
          required: true
          schema:
            $ref: "#/definitions/Thing"
parameters:
  ApiVersion:
    name: api-version
    in: query
    required: true
    type: string
"##;
        let doc = parse_document(yaml).unwrap();
        let op = &doc.paths["/things"].operations[&HttpMethod::Put];
        assert_eq!(op.parameter_count(), 2);
        assert_eq!(
            op.parameters()[0],
            Parameter::Reference {
                reference: "#/parameters/ApiVersion".into()
            }
        );

        match &op.parameters()[1] {
            Parameter::Inline(p) => {
                assert!(p.is_body());
                assert!(p.is_required());
                let schema = p.schema.as_ref().unwrap();
                assert_eq!(schema.reference.as_deref(), Some("#/definitions/Thing"));
            }
            other => panic!("expected inline parameter, got {:?}", other),
        }

        let api_version = &doc.parameters["ApiVersion"];
        assert_eq!(api_version.location.as_deref(), Some("query"));
        assert_eq!(api_version.extra["type"], "string");
    }

    #[test]
    fn parse_ms_extensions() {
        let yaml = r##"
swagger: "2.0"
paths:
  /jobs:
    put:
      operationId: Jobs_Create
      x-ms-pageable:
        nextLinkName: null
      x-ms-long-running-operation: true
      x-ms-long-running-operation-options:
        final-state-via: azure-async-operation
        final-state-schema: "#/definitions/Job"
      externalDocs:
        url: https://example.com/jobs
      responses:
        "200":
          description: OK
        x-ms-error-response: true
"##;
        let doc = parse_document(yaml).unwrap();
        let op = &doc.paths["/jobs"].operations[&HttpMethod::Put];
        assert!(op.pageable.is_some());
        assert!(op.long_running);
        assert_eq!(op.final_state_via(), "azure-async-operation");
        assert_eq!(op.final_state_schema_name(), Some("Job"));
        assert_eq!(
            op.external_docs.as_ref().unwrap().url.as_deref(),
            Some("https://example.com/jobs")
        );
        assert_eq!(op.response_codes(), vec!["200"]);
        assert_eq!(op.responses.len(), 2);
    }

    #[test]
    fn long_running_requires_literal_true() {
        let yaml = r##"
swagger: "2.0"
paths:
  /jobs:
    put:
      operationId: Jobs_Create
      x-ms-long-running-operation: "true"
"##;
        let doc = parse_document(yaml).unwrap();
        let op = &doc.paths["/jobs"].operations[&HttpMethod::Put];
        assert!(!op.long_running);
    }

    #[test]
    fn parse_schema_composition() {
        let yaml = r##"
swagger: "2.0"
definitions:
  Child:
    required: [name]
    allOf:
      - $ref: "#/definitions/Parent"
      - properties:
          extra:
            type: string
    properties:
      name:
        type: string
      nested:
        x-ms-client-flatten: true
        $ref: "#/definitions/Nested"
"##;
        let doc = parse_document(yaml).unwrap();
        let child = &doc.definitions["Child"];
        assert_eq!(child.required(), ["name".to_string()]);
        assert_eq!(child.all_of().len(), 2);
        assert!(child.all_of()[0].reference.is_some());
        assert!(child.all_of()[1].reference.is_none());

        let nested = &child.properties.as_ref().unwrap()["nested"];
        assert!(nested.client_flatten());
        assert_eq!(nested.reference.as_deref(), Some("#/definitions/Nested"));
    }

    #[test]
    fn parse_json_input() {
        let json = r##"{"swagger": "2.0", "paths": {}, "definitions": {"A": {"type": "object"}}}"##;
        let doc = parse_document(json).unwrap();
        assert!(doc.paths.is_empty());
        assert!(doc.definitions.contains_key("A"));
    }

    #[test]
    fn reject_openapi_3() {
        let yaml = r##"
openapi: "3.1.0"
info:
  title: New API
  version: "1.0.0"
paths: {}
"##;
        let result = parse_document(yaml);
        assert!(matches!(result, Err(ParseError::SchemaError(_))));
    }

    #[test]
    fn reject_unknown_format() {
        let result = parse_document("title: not a spec\n");
        assert!(matches!(result, Err(ParseError::UnknownFormat)));
    }

    #[test]
    fn skips_non_object_path_items_and_operations() {
        let yaml = r##"
swagger: "2.0"
paths:
  /broken: 42
  /partial:
    get: not-an-operation
    put:
      operationId: Partial_Put
"##;
        let doc = parse_document(yaml).unwrap();
        assert!(!doc.paths.contains_key("/broken"));

        let item = &doc.paths["/partial"];
        assert_eq!(item.operations.len(), 1);
        assert!(item.operations.contains_key(&HttpMethod::Put));
    }

    #[test]
    fn keeps_document_order() {
        let yaml = r##"
swagger: "2.0"
paths:
  /z:
    put:
      operationId: Z_Put
    get:
      operationId: Z_Get
  /a:
    get:
      operationId: A_Get
definitions:
  Zebra:
    type: object
  Aardvark:
    type: object
"##;
        let doc = parse_document(yaml).unwrap();
        let routes: Vec<&str> = doc.paths.keys().map(String::as_str).collect();
        assert_eq!(routes, vec!["/z", "/a"]);

        let verbs: Vec<HttpMethod> = doc.paths["/z"].operations.keys().copied().collect();
        assert_eq!(verbs, vec![HttpMethod::Put, HttpMethod::Get]);

        let names: Vec<&str> = doc.definitions.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Zebra", "Aardvark"]);
    }

    #[test]
    fn parse_document_file_records_filename() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("widgets.json");
        std::fs::write(&path, r##"{"swagger": "2.0"}"##).unwrap();

        let doc = parse_document_file(&path).unwrap();
        assert_eq!(doc.filename.as_deref(), Some("widgets.json"));
    }

    #[test]
    fn parse_document_file_missing_is_io_error() {
        let result = parse_document_file(std::path::Path::new("does-not-exist.yaml"));
        assert!(matches!(result, Err(ParseError::Io(_))));
    }
}
