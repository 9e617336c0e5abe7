use std::path::PathBuf;
use thiserror::Error;

/// The main error type for vocyolo operations.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse XML from {path}: {message}")]
    XmlParse { path: PathBuf, message: String },

    #[error("Missing required field <{field}> in {context} of {path}")]
    MissingField {
        path: PathBuf,
        field: String,
        context: String,
    },

    #[error("Malformed label line {line} in {path}: {message}")]
    MalformedLine {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error(
        "Class id {class_id} on line {line} of {path} is out of range for {class_count} label(s)"
    )]
    UnknownClassId {
        path: PathBuf,
        line: usize,
        class_id: u32,
        class_count: usize,
    },

    #[error("Class name '{name}' is not in the supplied label vocabulary")]
    UnknownClassName { name: String },

    #[error("Failed to parse label file {path}: {source}")]
    VocabParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid label file {path}: {message}")]
    VocabInvalid { path: PathBuf, message: String },

    #[error("Invalid box geometry in {path}: {message}")]
    InvalidGeometry { path: PathBuf, message: String },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}
