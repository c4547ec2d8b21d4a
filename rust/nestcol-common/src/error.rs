use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    /// The named field does not resolve under the requested scope.
    pub fn field_not_found(field: impl Into<String>, dataset: impl Into<String>) -> Error {
        Error(
            ErrorKind::FieldNotFound {
                field: field.into(),
                dataset: dataset.into(),
            }
            .into(),
        )
    }

    /// A view was requested over a mappable field that carries read callbacks.
    pub fn incompatible_view(field: impl Into<String>) -> Error {
        Error(
            ErrorKind::IncompatibleView {
                field: field.into(),
            }
            .into(),
        )
    }

    /// An index lies outside the bounds of a field or cluster.
    pub fn out_of_range(name: impl Into<String>, index: u64, bound: u64) -> Error {
        Error(
            ErrorKind::OutOfRange {
                name: name.into(),
                index,
                bound,
            }
            .into(),
        )
    }

    pub fn type_mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Error {
        Error(
            ErrorKind::TypeMismatch {
                field: field.into(),
                expected: expected.into(),
                actual: actual.into(),
            }
            .into(),
        )
    }

    pub fn invalid_format(element: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidFormat {
                element: element.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_operation(name: impl Into<String>) -> Error {
        Error(ErrorKind::InvalidOperation { name: name.into() }.into())
    }

    pub fn is_field_not_found(&self) -> bool {
        matches!(self.kind(), ErrorKind::FieldNotFound { .. })
    }

    pub fn is_incompatible_view(&self) -> bool {
        matches!(self.kind(), ErrorKind::IncompatibleView { .. })
    }

    pub fn is_out_of_range(&self) -> bool {
        matches!(self.kind(), ErrorKind::OutOfRange { .. })
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("no field named '{field}' in dataset '{dataset}'")]
    FieldNotFound { field: String, dataset: String },

    #[error("view disallowed on field '{field}' with mappable type and read callback")]
    IncompatibleView { field: String },

    #[error("index {index} out of range for '{name}' (bound {bound})")]
    OutOfRange { name: String, index: u64, bound: u64 },

    #[error("type mismatch for field '{field}': expected {expected}, found {actual}")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid operation {name}")]
    InvalidOperation { name: String },

    #[error("invalid storage format for '{element}': {message}")]
    InvalidFormat { element: String, message: String },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}
