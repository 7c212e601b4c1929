use super::TypeRef;

/// A `Collection(T)` type reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionType {
    /// Element type, simple or structured. Never itself a collection in CSDL,
    /// but nothing here relies on that.
    pub element: Box<TypeRef>,
}

impl CollectionType {
    pub fn new(element: TypeRef) -> Self {
        Self {
            element: Box::new(element),
        }
    }

    pub fn element(&self) -> &TypeRef {
        &self.element
    }

    /// Returns the element type name if `name` has the form `Collection(T)`.
    pub fn element_name(name: &str) -> Option<&str> {
        name.trim()
            .strip_prefix("Collection(")?
            .strip_suffix(')')
            .map(str::trim)
    }
}

impl From<CollectionType> for TypeRef {
    fn from(value: CollectionType) -> Self {
        Self::Collection(value)
    }
}
