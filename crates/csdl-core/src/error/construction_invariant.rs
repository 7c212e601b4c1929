use super::Error;

/// Error when a structural invariant is violated while a node is built.
///
/// Raised immediately by the phase 1 constructor, e.g. an `Association` whose
/// two ends share a role name, or one that does not declare exactly two ends.
#[derive(Debug)]
pub(super) struct ConstructionInvariant {
    message: Box<str>,
}

impl std::error::Error for ConstructionInvariant {}

impl core::fmt::Display for ConstructionInvariant {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invariant violated: {}", self.message)
    }
}

impl Error {
    /// Creates a construction invariant error.
    pub fn construction_invariant(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::ConstructionInvariant(
            ConstructionInvariant {
                message: message.into().into(),
            },
        ))
    }

    /// Returns `true` if this error is a construction invariant error.
    pub fn is_construction_invariant(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::ConstructionInvariant(_)))
    }
}
