use std::borrow::Cow;
use std::path::PathBuf;

use thiserror::Error;

use crate::record::{FieldHandle, RecordDescriptor};
use crate::value::FieldValue;

/// Fatal failures raised while translating between native attributes and typed records.
///
/// Non-fatal outcomes (an attribute with no matching field, an option name that maps to no code)
/// never surface here; the converters skip them and leave a debug log entry instead.
#[derive(Debug, Error)]
pub enum MappingError {
    /// The integer code has no entry in the field's option list.
    #[error("no option with value {code} found for field '{field}' (enum {enum_type})")]
    OptionNotFound { field: String, enum_type: String, code: i32 },

    /// The option exists but no generated constant carries its label.
    #[error("no enum constant found for '{label}' with value {code} in enum {enum_type}")]
    EnumConstantNotFound { enum_type: String, label: String, code: i32 },

    /// Generated type and CRM metadata disagree about the shape of a field.
    #[error("schema mismatch on {type_name}.{field}: {message}")]
    SchemaMismatch { type_name: String, field: String, message: String },

    /// A lookup value carries an id that is not a record id.
    #[error("lookup field '{field}' has invalid record id '{id}'")]
    InvalidReferenceId { field: String, id: String },
}

impl MappingError {
    pub fn schema_mismatch(type_name: impl Into<String>, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            type_name: type_name.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    /// A value was rejected by the generated setter of `field`.
    pub fn field_type_mismatch(descriptor: &RecordDescriptor, field: &FieldHandle, rejected: &FieldValue) -> Self {
        let message = if rejected.is_null() {
            "null assigned to a non-nullable field".to_string()
        } else {
            format!("{} value cannot be assigned to a {} field", rejected.kind_name(), field.kind)
        };
        Self::schema_mismatch(descriptor.type_name, field.name, message)
    }

    /// A handle that does not belong to the record it was used on.
    pub fn unknown_field(descriptor: &RecordDescriptor, field: &FieldHandle) -> Self {
        Self::schema_mismatch(descriptor.type_name, field.name, "field is not declared on this record type")
    }
}

/// Failures reported by a [`crate::service::CrmService`] implementation.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The addressed record does not exist.
    #[error("{entity} record '{id}' not found")]
    NotFound { entity: String, id: String },

    /// The CRM refused the request.
    #[error("request rejected: {message}")]
    Rejected { message: String },

    /// Connection-level failure.
    #[error("transport error: {message}")]
    Transport { message: Cow<'static, str> },
}

/// Errors raised while preparing or running a workflow step.
#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The step is configured in a way that cannot run.
    #[error("step misconfigured: {}", issues.iter().map(|issue| issue.message.as_str()).collect::<Vec<_>>().join("; "))]
    Misconfigured { issues: Vec<ValidationIssue> },

    /// Input supplied at run time is unusable.
    #[error("{message}")]
    InvalidInput { message: String },
}

impl StepError {
    pub fn misconfigured(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Misconfigured {
            issues: vec![ValidationIssue::new(field, code, message)],
        }
    }
}

/// Failures loading configuration or schema files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported file format '{extension}' (expected .json or .toml)")]
    UnsupportedFormat { extension: String },
}

/// Detailed configuration problem for a single setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}
