use super::Error;

/// Error when a name reference cannot be resolved against the schema.
///
/// This occurs when:
/// - A property, entity set or association end names a type that is not declared
/// - A navigation property names an association or role that does not exist
/// - An association set end names an entity set missing from its container
/// - A key names a property the entity type does not declare
///
/// These errors abort schema construction. A schema is never handed out with
/// a dangling reference.
#[derive(Debug)]
pub(super) struct SchemaConsistency {
    message: Box<str>,
}

impl std::error::Error for SchemaConsistency {}

impl core::fmt::Display for SchemaConsistency {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "schema inconsistency: {}", self.message)
    }
}

impl Error {
    /// Creates a schema consistency error.
    pub fn schema_consistency(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::SchemaConsistency(SchemaConsistency {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is a schema consistency error.
    pub fn is_schema_consistency(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::SchemaConsistency(_)))
    }
}
