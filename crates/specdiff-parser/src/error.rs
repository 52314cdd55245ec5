use thiserror::Error;

/// Errors produced while loading a document (E2001–E2004).
#[derive(Debug, Error)]
pub enum ParseError {
    /// E2001: File is not a Swagger/OpenAPI document at all.
    #[error("E2001: not a valid OpenAPI 2.0 document (missing 'swagger' field)")]
    UnknownFormat,

    /// E2002: YAML/JSON parse error.
    #[error("E2002: parse error: {0}")]
    ParseError(String),

    /// E2003: Structurally invalid document.
    #[error("E2003: schema error: {0}")]
    SchemaError(String),

    /// E2004: I/O error reading the document file.
    #[error("E2004: I/O error: {0}")]
    Io(#[from] std::io::Error),
}
