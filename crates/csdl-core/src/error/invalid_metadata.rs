use super::Error;

/// Error when the raw metadata tree does not have the expected CSDL shape.
///
/// This occurs when a required attribute is missing, or when a JSON value of
/// the wrong kind sits where an element is expected.
#[derive(Debug)]
pub(super) struct InvalidMetadata {
    message: Box<str>,
}

impl std::error::Error for InvalidMetadata {}

impl core::fmt::Display for InvalidMetadata {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid metadata: {}", self.message)
    }
}

impl Error {
    /// Creates an invalid metadata error.
    pub fn invalid_metadata(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidMetadata(InvalidMetadata {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid metadata error.
    pub fn is_invalid_metadata(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::InvalidMetadata(_)))
    }
}
