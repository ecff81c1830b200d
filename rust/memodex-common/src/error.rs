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

    pub fn invalid_field_spec(spec: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidFieldSpec {
                spec: spec.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn duplicate_field_spec(spec: impl Into<String>) -> Error {
        Error(ErrorKind::DuplicateFieldSpec { spec: spec.into() }.into())
    }

    pub fn invalid_options(option: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidOptions {
                option: option.into(),
                message: message.into(),
            }
            .into(),
        )
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid field spec '{spec}': {message}")]
    InvalidFieldSpec { spec: String, message: String },

    #[error("field spec '{spec}' is declared more than once")]
    DuplicateFieldSpec { spec: String },

    #[error("invalid indexer option {option}: {message}")]
    InvalidOptions { option: String, message: String },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}
