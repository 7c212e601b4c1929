use super::Error;

/// Error when a collaborator cannot handle the request it was given.
///
/// Authentication strategies reject with this marker so the connection
/// bootstrap can move on to the next strategy.
#[derive(Debug)]
pub(super) struct Unsupported {
    message: Box<str>,
}

impl std::error::Error for Unsupported {}

impl core::fmt::Display for Unsupported {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "unsupported: {}", self.message)
    }
}

impl Error {
    /// Creates an unsupported error.
    pub fn unsupported(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::Unsupported(Unsupported {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error carries the unsupported marker.
    pub fn is_unsupported(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::Unsupported(_)))
    }
}
