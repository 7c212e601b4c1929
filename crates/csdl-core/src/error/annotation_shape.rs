use super::Error;

/// Error when an annotation does not match any known shape for its term.
///
/// These errors are recoverable. The extension layer records them and skips
/// the offending annotation unless strict mode is enabled.
#[derive(Debug)]
pub(super) struct AnnotationShape {
    term: Box<str>,
    message: Box<str>,
    /// The record matched more than one variant.
    ambiguous: bool,
}

impl std::error::Error for AnnotationShape {}

impl core::fmt::Display for AnnotationShape {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let what = if self.ambiguous {
            "ambiguous"
        } else {
            "malformed"
        };
        write!(f, "{what} annotation `{}`: {}", self.term, self.message)
    }
}

impl Error {
    /// Creates an annotation shape error for `term`.
    pub fn annotation_shape(term: impl Into<String>, message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::AnnotationShape(AnnotationShape {
            term: term.into().into(),
            message: message.into().into(),
            ambiguous: false,
        }))
    }

    /// Creates an annotation shape error for a record that matches more than
    /// one variant.
    pub fn ambiguous_annotation(term: impl Into<String>, message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::AnnotationShape(AnnotationShape {
            term: term.into().into(),
            message: message.into().into(),
            ambiguous: true,
        }))
    }

    /// Returns `true` if this error is an annotation shape error.
    pub fn is_annotation_shape(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::AnnotationShape(_)))
    }

    /// Returns `true` if this error flags an ambiguous annotation record.
    pub fn is_ambiguous_annotation(&self) -> bool {
        self.any_kind(|kind| {
            matches!(kind, super::ErrorKind::AnnotationShape(err) if err.ambiguous)
        })
    }

    /// The term of the first annotation shape error in the context chain.
    pub fn annotation_term(&self) -> Option<&str> {
        self.chain().find_map(|err| match err.kind() {
            super::ErrorKind::AnnotationShape(err) => Some(&*err.term),
            _ => None,
        })
    }
}
