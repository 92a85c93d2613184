use crate::shape::Kind;
use thiserror::Error as ThisError;

///
/// Error
///
/// Every failure surfaced by descriptor compilation, filter building and
/// update building. There is no partial-success mode: any error means the
/// caller must not proceed with the query or update.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum Error {
    #[error("input is invalid: expected a struct, got {kind}")]
    InvalidInputKind { kind: InputKind },

    #[error("field `{field}` must be a struct, got {kind}")]
    UnsupportedFieldKind { field: String, kind: Kind },

    #[error("field `{field}`: {reason}")]
    InvalidFieldAnnotation {
        field: String,
        reason: AnnotationError,
    },

    #[error("field `{field}` declares unknown query operator `{token}`")]
    UnknownQueryOperator { field: String, token: String },

    #[error("field `{field}` declares unknown update operator `{token}`")]
    UnknownUpdateOperator { field: String, token: String },

    #[error("merge_json needs a serialized document, got {kind}")]
    ProjectionFailure { kind: &'static str },

    #[error("merge_json value failed to serialize: {message}")]
    SerializationFailure { message: String },

    #[error("column `{column}` expects a {expected} value, got {found}")]
    InvalidFieldValue {
        column: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("builder panicked: {message}")]
    Panicked { message: String },
}

impl Error {
    pub(crate) fn annotation(field: impl Into<String>, reason: AnnotationError) -> Self {
        Self::InvalidFieldAnnotation {
            field: field.into(),
            reason,
        }
    }

    /// Coarse classification used by metrics and callers that only need to
    /// know which side of the boundary failed.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidInputKind { .. } => ErrorClass::Input,
            Self::UnsupportedFieldKind { .. }
            | Self::InvalidFieldAnnotation { .. }
            | Self::UnknownQueryOperator { .. }
            | Self::UnknownUpdateOperator { .. } => ErrorClass::Schema,
            Self::ProjectionFailure { .. }
            | Self::SerializationFailure { .. }
            | Self::InvalidFieldValue { .. } => ErrorClass::Value,
            Self::Panicked { .. } => ErrorClass::Internal,
        }
    }
}

///
/// ErrorClass
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorClass {
    /// The top-level argument was not a struct.
    Input,
    /// A declared annotation is not valid for its field.
    Schema,
    /// A runtime value did not fit its operator.
    Value,
    /// Recovered panic.
    Internal,
}

///
/// InputKind
/// What the top-level argument turned out to be when it was not a struct.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InputKind {
    Null,
    Value(&'static str),
}

impl std::fmt::Display for InputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Value(kind) => write!(f, "{kind}"),
        }
    }
}

///
/// AnnotationError
///
/// One variant per descriptor validation rule.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum AnnotationError {
    #[error("flattened field cannot declare a column")]
    EmbeddedWithColumn,

    #[error("flattened field embeds `{name}`, which is already being flattened")]
    RecursiveFlatten { name: &'static str },

    #[error("`or` field cannot declare a column")]
    OrWithColumn,

    #[error("`or` field must be a struct or a list of structs, got {kind}")]
    OrNotStruct { kind: Kind },

    #[error("field needs a column")]
    MissingColumn,

    #[error("`{op}` field must be a list, got {kind}")]
    MembershipNotList { op: &'static str, kind: Kind },

    #[error("`=` field cannot be a list")]
    EqualityOnList,

    #[error("`like` field must be text, got {kind}")]
    LikeNotText { kind: Kind },
}
