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

    /// A column path, descriptor or converter tree that does not line up with
    /// the schema it is used against.
    pub fn schema_mismatch(path: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::SchemaMismatch {
                path: path.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    /// A converter (or value) was asked for a capability it does not provide.
    pub fn capability_mismatch(expected: impl Into<String>, node: impl Into<String>) -> Error {
        Error(
            ErrorKind::CapabilityMismatch {
                expected: expected.into(),
                node: node.into(),
            }
            .into(),
        )
    }

    pub fn missing_required_field(path: impl Into<String>) -> Error {
        Error(ErrorKind::MissingRequiredField { path: path.into() }.into())
    }

    pub fn is_schema_mismatch(&self) -> bool {
        matches!(self.kind(), ErrorKind::SchemaMismatch { .. })
    }

    pub fn is_capability_mismatch(&self) -> bool {
        matches!(self.kind(), ErrorKind::CapabilityMismatch { .. })
    }

    pub fn is_invalid_format(&self) -> bool {
        matches!(self.kind(), ErrorKind::InvalidFormat { .. })
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid operation {name}")]
    InvalidOperation { name: String },

    #[error("schema mismatch at '{path}': {message}")]
    SchemaMismatch { path: String, message: String },

    #[error("'{node}' does not support {expected}")]
    CapabilityMismatch { expected: String, node: String },

    #[error("invalid storage format for '{element}': {message}")]
    InvalidFormat { element: String, message: String },

    #[error("required field '{path}' is missing")]
    MissingRequiredField { path: String },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, ErrorKind};

    #[test]
    fn test_error_kinds() {
        let err = Error::schema_mismatch("Name.Url", "field 'Url' not found");
        assert!(err.is_schema_mismatch());
        assert_eq!(
            err.to_string(),
            "schema mismatch at 'Name.Url': field 'Url' not found"
        );

        let err = Error::capability_mismatch("primitive values", "Links");
        assert!(err.is_capability_mismatch());
        assert_eq!(err.to_string(), "'Links' does not support primitive values");

        let err = Error::invalid_format("DocId", "definition level 3 exceeds 0");
        assert!(err.is_invalid_format());
        assert!(matches!(err.into_kind(), ErrorKind::InvalidFormat { .. }));

        let err = Error::missing_required_field("Name.Language.Code");
        assert_eq!(
            err.to_string(),
            "required field 'Name.Language.Code' is missing"
        );
    }
}
