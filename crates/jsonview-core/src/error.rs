use crate::{
    coerce::CoercionError, config::ConfigError, engine::ResolutionError, schema::SchemaError,
};
use derive_more::Display;
use thiserror::Error as ThisError;

///
/// ViewError
///
/// Failure surfaced by every view operation.
/// Callers branch on the variant (or on `class()`), never on message text.
/// `Field` carries the document path at which a nested failure occurred.
///

#[derive(Debug, ThisError)]
pub enum ViewError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Coercion(#[from] CoercionError),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("document is not valid json: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("view failed at {path}: {source}")]
    Field {
        path: String,
        #[source]
        source: Box<Self>,
    },
}

impl ViewError {
    /// Prepend a field segment to the error path.
    #[must_use]
    pub fn with_field(self, field: impl AsRef<str>) -> Self {
        self.with_path_segment(field.as_ref())
    }

    /// Prepend an index segment to the error path.
    #[must_use]
    pub fn with_index(self, index: usize) -> Self {
        self.with_path_segment(format!("[{index}]"))
    }

    /// Return the full document path, if the error carries one.
    #[must_use]
    pub const fn path(&self) -> Option<&str> {
        match self {
            Self::Field { path, .. } => Some(path.as_str()),
            _ => None,
        }
    }

    /// Return the innermost, non-context error.
    #[must_use]
    pub fn leaf(&self) -> &Self {
        match self {
            Self::Field { source, .. } => source.leaf(),
            _ => self,
        }
    }

    /// Classify the failure, looking through field context.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self.leaf() {
            Self::Schema(_) | Self::Config(_) => ErrorClass::Configuration,
            Self::Resolution(_) => ErrorClass::Resolution,
            Self::Coercion(_) | Self::Parse(_) => ErrorClass::Coercion,
            Self::Access(_) | Self::Field { .. } => ErrorClass::Access,
        }
    }

    fn with_path_segment(self, segment: impl Into<String>) -> Self {
        let segment = segment.into();
        match self {
            Self::Field { path, source } => Self::Field {
                path: Self::join_segments(&segment, &path),
                source,
            },
            source => Self::Field {
                path: segment,
                source: Box::new(source),
            },
        }
    }

    fn join_segments(prefix: &str, suffix: &str) -> String {
        if suffix.starts_with('[') {
            format!("{prefix}{suffix}")
        } else {
            format!("{prefix}.{suffix}")
        }
    }
}

///
/// AccessError
///
/// Opaque accessor-layer failure: a reader or writer was handed a value of the
/// wrong runtime shape. Never retried, never handled selectively.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("accessor failure on {type_tag}: {message}")]
pub struct AccessError {
    pub type_tag: &'static str,
    pub message: String,
}

impl AccessError {
    pub fn new(type_tag: &'static str, message: impl Into<String>) -> Self {
        Self {
            type_tag,
            message: message.into(),
        }
    }
}

///
/// ErrorClass
/// Failure taxonomy callers branch on.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum ErrorClass {
    /// Schema or engine misconfiguration; fatal, not recoverable per request.
    #[display("configuration")]
    Configuration,
    /// Identity resolution failed (missing entity, abstract type).
    #[display("resolution")]
    Resolution,
    /// A json value could not be converted to or from a native value.
    #[display("coercion")]
    Coercion,
    /// Accessor-layer failure.
    #[display("access")]
    Access,
}
