//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid resource object: {message}")]
    InvalidObject { message: String },

    #[error("Unable to set value at '{path}': '{segment}' already holds a non-map value")]
    ValuesPath { path: String, segment: String },

    #[error("Values merge error at '{path}': {message}")]
    ValuesMerge { path: String, message: String },

    #[error("Unsupported value: {message}")]
    UnsupportedValue { message: String },

    #[error("Failed to serialize YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl CoreError {
    pub(crate) fn invalid_object(message: impl Into<String>) -> Self {
        Self::InvalidObject {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
