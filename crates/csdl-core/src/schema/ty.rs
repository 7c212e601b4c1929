use super::{
    CollectionType, ComplexType, EntityType, EnumType, PrimitiveType, Property, SchemaId,
};
use std::fmt;

/// Identifies a named type within its document: the declaring schema plus
/// the index into that schema's type registry.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId {
    pub schema: SchemaId,
    pub index: usize,
}

/// A resolved reference to a type, as used by properties, parameters and
/// return types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Primitive(PrimitiveType),
    Entity(TypeId),
    Complex(TypeId),
    Enum(TypeId),
    Collection(CollectionType),
}

/// A named type declared by a schema.
#[derive(Debug, Clone)]
pub enum Type {
    Entity(EntityType),
    Complex(ComplexType),
    Enum(EnumType),
}

impl TypeId {
    pub(crate) const fn placeholder() -> Self {
        Self {
            schema: SchemaId::placeholder(),
            index: usize::MAX,
        }
    }

    pub fn is_placeholder(self) -> bool {
        self == Self::placeholder()
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "TypeId({}/{})", self.schema.0, self.index)
    }
}

impl TypeRef {
    /// Stand-in used between phase 1 and phase 2.
    pub(crate) const fn placeholder() -> Self {
        Self::Entity(TypeId::placeholder())
    }

    pub(crate) fn is_placeholder(&self) -> bool {
        match self {
            Self::Entity(id) | Self::Complex(id) | Self::Enum(id) => id.is_placeholder(),
            Self::Collection(collection) => collection.element.is_placeholder(),
            Self::Primitive(_) => false,
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Self::Collection(..))
    }

    /// The element type for collections, `self` otherwise.
    pub fn element(&self) -> &TypeRef {
        match self {
            Self::Collection(collection) => collection.element(),
            _ => self,
        }
    }

    /// The named type this reference points at, looking through collections.
    pub fn type_id(&self) -> Option<TypeId> {
        match self.element() {
            Self::Entity(id) | Self::Complex(id) | Self::Enum(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_primitive(&self) -> Option<PrimitiveType> {
        match self {
            Self::Primitive(primitive) => Some(*primitive),
            _ => None,
        }
    }

    pub fn is_entity(&self) -> bool {
        matches!(self.element(), Self::Entity(..))
    }
}

impl From<PrimitiveType> for TypeRef {
    fn from(value: PrimitiveType) -> Self {
        Self::Primitive(value)
    }
}

impl Type {
    pub fn id(&self) -> TypeId {
        match self {
            Self::Entity(ty) => ty.id,
            Self::Complex(ty) => ty.id,
            Self::Enum(ty) => ty.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Entity(ty) => &ty.name,
            Self::Complex(ty) => &ty.name,
            Self::Enum(ty) => &ty.name,
        }
    }

    /// The CSDL element name, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Entity(_) => "EntityType",
            Self::Complex(_) => "ComplexType",
            Self::Enum(_) => "EnumType",
        }
    }

    /// A reference to this type.
    pub fn type_ref(&self) -> TypeRef {
        match self {
            Self::Entity(ty) => TypeRef::Entity(ty.id),
            Self::Complex(ty) => TypeRef::Complex(ty.id),
            Self::Enum(ty) => TypeRef::Enum(ty.id),
        }
    }

    /// Structural properties; enum types have none.
    pub fn properties(&self) -> &[Property] {
        match self {
            Self::Entity(ty) => &ty.properties,
            Self::Complex(ty) => &ty.properties,
            Self::Enum(_) => &[],
        }
    }

    pub(crate) fn properties_mut(&mut self) -> &mut [Property] {
        match self {
            Self::Entity(ty) => &mut ty.properties,
            Self::Complex(ty) => &mut ty.properties,
            Self::Enum(_) => &mut [],
        }
    }

    pub fn is_entity(&self) -> bool {
        matches!(self, Self::Entity(..))
    }

    pub fn as_entity(&self) -> Option<&EntityType> {
        match self {
            Self::Entity(ty) => Some(ty),
            _ => None,
        }
    }

    #[track_caller]
    pub fn expect_entity(&self) -> &EntityType {
        match self {
            Self::Entity(ty) => ty,
            _ => panic!("expected entity type, but was {}", self.kind_name()),
        }
    }

    #[track_caller]
    pub(crate) fn expect_entity_mut(&mut self) -> &mut EntityType {
        match self {
            Self::Entity(ty) => ty,
            _ => panic!("expected entity type, but was {}", self.kind_name()),
        }
    }

    pub fn as_complex(&self) -> Option<&ComplexType> {
        match self {
            Self::Complex(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumType> {
        match self {
            Self::Enum(ty) => Some(ty),
            _ => None,
        }
    }
}
