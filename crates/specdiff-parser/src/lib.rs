//! OpenAPI 2.0 (Swagger) document loader.
//!
//! Reads YAML/JSON documents into a read-only [`ApiDocument`] carrying
//! `paths`, `definitions` and `parameters`, plus the local `$ref`
//! resolution helpers the comparator relies on.

pub mod error;
pub mod model;
pub mod parser;
pub mod resolve;

pub use error::ParseError;
pub use model::{
    ApiDocument, ExternalDocs, HttpMethod, LongRunningOptions, Operation, Parameter,
    ParameterObject, PathItem, Response, Schema,
};
pub use parser::{parse_document, parse_document_file};
pub use resolve::{local_definition, local_parameter, reference_name};
