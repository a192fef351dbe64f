use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    #[error("input is neither a binary actor file nor a JSON actor document")]
    UnsupportedEncoding,

    #[error("unexpected end of stream at offset {offset} (needed {needed} bytes)")]
    UnexpectedEof { offset: usize, needed: usize },

    #[error("invalid value: {message}")]
    InvalidValue { message: String },

    #[error("unbalanced scope: {message}")]
    UnbalancedScope { message: String },

    #[error("singular world transform on component {component}")]
    SingularTransform { component: usize },

    #[cfg(feature = "binary")]
    #[error("failed to parse binary actor: {message}")]
    BinaryParse { message: String },

    #[cfg(feature = "json")]
    #[error("failed to parse actor JSON: {message}")]
    JsonParse { message: String },

    #[cfg(feature = "json")]
    #[error("invalid field '{label}': {message}")]
    JsonField { label: String, message: String },
}

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidValue {
            message: message.into(),
        }
    }
}
