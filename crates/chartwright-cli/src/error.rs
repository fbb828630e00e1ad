//! CLI error types with exit code handling
//!
//! This module provides a unified error type for CLI operations that
//! maps errors to appropriate exit codes.

use chartwright_convert::ConvertError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// A manifest could not be read as Kubernetes objects
    #[error("Invalid input: {message}")]
    #[diagnostic(code(chartwright::cli::input))]
    Input {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// A converter failed or produced conflicting values
    #[error("Conversion failed: {message}")]
    #[diagnostic(code(chartwright::cli::convert))]
    Convert {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Invalid arguments
    #[error("{message}")]
    #[diagnostic(code(chartwright::cli::usage))]
    Usage {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(chartwright::cli::io))]
    Io { message: String },

    /// Ctrl-C arrived before the chart was written
    #[error("Interrupted, no files were written")]
    #[diagnostic(code(chartwright::cli::interrupted))]
    Interrupted,

    /// Internal error (runtime, unexpected failure)
    #[error("Internal error: {message}")]
    #[diagnostic(code(chartwright::cli::internal))]
    Internal { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Input { .. } => exit_codes::INPUT_ERROR,
            CliError::Convert { .. } => exit_codes::CONVERT_ERROR,
            CliError::Usage { .. } => exit_codes::USAGE_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Interrupted => exit_codes::INTERRUPTED,
            CliError::Internal { .. } => exit_codes::ERROR,
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create an input error
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
            help: None,
        }
    }

    /// Create a usage error with help text
    pub fn usage_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
            help: Some(help.into()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<ConvertError> for CliError {
    fn from(err: ConvertError) -> Self {
        let message = err.to_string();
        match err {
            ConvertError::Decode { .. } | ConvertError::InvalidDocument { .. } => Self::Input {
                message,
                help: Some("Every document must be a Kubernetes object with apiVersion, kind and metadata.name".to_string()),
            },
            ConvertError::InvalidChartName(_) => Self::usage_with_help(
                message,
                "Pass --name or pick a chart directory named like my-app",
            ),
            ConvertError::Values { .. } => Self::Convert {
                message,
                help: Some("Two objects map to the same values key; rename one of them".to_string()),
            },
            ConvertError::Io(_) | ConvertError::Write { .. } => Self::Io { message },
            _ => Self::Convert {
                message,
                help: None,
            },
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
