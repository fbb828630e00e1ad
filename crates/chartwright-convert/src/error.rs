//! Error and warning types for the converter
//!
//! Errors abort the run; warnings are collected alongside the chart and
//! logged as they happen.

use chartwright_core::{CoreError, NamespaceConflict, ResourceObject};
use std::path::PathBuf;
use thiserror::Error;

/// Converter error
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Failed to decode document {document} of {source_name}: {error}")]
    Decode {
        source_name: String,
        document: usize,
        #[source]
        error: serde_yaml::Error,
    },

    #[error("Invalid document {document} of {source_name}: {error}")]
    InvalidDocument {
        source_name: String,
        document: usize,
        #[source]
        error: CoreError,
    },

    #[error("{processor} converter failed for {object}: {source}")]
    Processor {
        processor: &'static str,
        object: String,
        #[source]
        source: Box<ConvertError>,
    },

    #[error("Unable to merge values of {object}: {source}")]
    Values {
        object: String,
        #[source]
        source: CoreError,
    },

    #[error("Malformed {object}: {message}")]
    Malformed { object: String, message: String },

    #[error("Invalid chart name '{0}': use lowercase letters, digits and dashes")]
    InvalidChartName(String),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ConvertError {
    /// Error for an object whose fields do not have the expected shape
    pub fn malformed(obj: &ResourceObject, message: impl Into<String>) -> Self {
        Self::Malformed {
            object: obj.to_string(),
            message: message.into(),
        }
    }
}

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;

// =============================================================================
// WARNING SYSTEM
// =============================================================================

/// Warning severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WarningSeverity {
    /// Informational - conversion succeeded, nothing to review
    Info,
    /// Warning - conversion succeeded but manual review recommended
    Warning,
}

impl WarningSeverity {
    /// Get the label for this severity
    pub fn label(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
        }
    }

    /// Get the icon for this severity
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Info => "ℹ",
            Self::Warning => "⚠",
        }
    }
}

/// Warning category for grouping related warnings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningCategory {
    /// No dedicated converter, object emitted as-is
    UnknownKind,
    /// Objects disagree on the application namespace
    Namespace,
    /// Object consumed by a converter without a template of its own
    Absorbed,
}

/// Non-fatal note produced during conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionWarning {
    pub severity: WarningSeverity,
    pub category: WarningCategory,
    /// Object the warning refers to (`namespace/Kind/name`)
    pub object: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl ConversionWarning {
    /// Object handled by the passthrough converter
    pub fn unknown_kind(obj: &ResourceObject) -> Self {
        Self {
            severity: WarningSeverity::Warning,
            category: WarningCategory::UnknownKind,
            object: obj.to_string(),
            message: format!("no converter for {}, copied without parameters", obj.gvk()),
            suggestion: Some("Review the template and move tunable fields to values.yaml".to_string()),
        }
    }

    /// Two observed objects implied different namespaces
    pub fn namespace_conflict(conflict: &NamespaceConflict) -> Self {
        Self {
            severity: WarningSeverity::Warning,
            category: WarningCategory::Namespace,
            object: conflict.object.clone(),
            message: format!(
                "namespace '{}' replaces '{}'",
                conflict.current, conflict.previous
            ),
            suggestion: Some("All objects are installed into the release namespace".to_string()),
        }
    }

    /// Object folded into the chart without producing a template
    pub fn absorbed(obj: &ResourceObject) -> Self {
        let suggestion = obj.is_namespace().then(|| {
            format!(
                "Install with --namespace {} --create-namespace",
                obj.name()
            )
        });
        Self {
            severity: WarningSeverity::Info,
            category: WarningCategory::Absorbed,
            object: obj.to_string(),
            message: format!("{} produces no template", obj.gvk()),
            suggestion,
        }
    }
}

impl std::fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} - {}",
            self.severity.label(),
            self.object,
            self.message
        )?;

        if let Some(ref suggestion) = self.suggestion {
            write!(f, "\n  {} {}", self.severity.icon(), suggestion)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_display() {
        let obj = ResourceObject::from_yaml(
            "apiVersion: example.com/v1\nkind: Widget\nmetadata:\n  name: w\n  namespace: ns\n",
        )
        .unwrap();
        let warning = ConversionWarning::unknown_kind(&obj);
        let text = warning.to_string();

        assert!(text.starts_with("[warning] ns/Widget/w - no converter for Widget.v1.example.com"));
        assert!(text.contains("values.yaml"));
    }

    #[test]
    fn test_absorbed_namespace_is_info() {
        let obj = ResourceObject::from_yaml("apiVersion: v1\nkind: Namespace\nmetadata:\n  name: shop\n").unwrap();
        let warning = ConversionWarning::absorbed(&obj);

        assert_eq!(warning.severity, WarningSeverity::Info);
        assert_eq!(warning.category, WarningCategory::Absorbed);
        assert_eq!(
            warning.to_string(),
            "[info] Namespace/shop - Namespace.v1 produces no template\n  ℹ Install with --namespace shop --create-namespace"
        );
    }

    #[test]
    fn test_processor_error_keeps_context() {
        let err = ConvertError::Processor {
            processor: "Deployment",
            object: "ns/Deployment/web".to_string(),
            source: Box::new(ConvertError::Malformed {
                object: "ns/Deployment/web".to_string(),
                message: "spec.replicas is not a number".to_string(),
            }),
        };

        let text = err.to_string();
        assert!(text.contains("Deployment converter failed for ns/Deployment/web"));
        assert!(text.contains("spec.replicas"));
    }
}
