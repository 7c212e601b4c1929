//! Structural CSDL schema.
//!
//! Nodes are built in two phases. Phase 1 builds every node from its own
//! metadata fragment and leaves cross references as placeholders. Phase 2
//! ([`Builder`]) runs once all nodes exist and resolves those references by
//! name. A [`Schema`] is only handed out after phase 2, so resolved IDs are
//! always valid.

mod annotation;
pub use annotation::{Annotation, AnnotationValue, Annotations, Record};

mod association;
pub use association::{
    Association, AssociationEnd, AssociationId, ConstraintEnd, Multiplicity,
    ReferentialConstraint,
};

mod association_set;
pub use association_set::{AssociationSet, AssociationSetEnd};

mod builder;
pub use builder::Builder;

mod collection;
pub use collection::CollectionType;

mod complex_type;
pub use complex_type::ComplexType;

mod container;
pub use container::{
    ContainerId, EntityContainer, EntitySet, EntitySetId, FunctionImport, Parameter,
};

mod dialect;
pub use dialect::Dialect;

mod entity_type;
pub use entity_type::EntityType;

mod enum_type;
pub use enum_type::{EnumMember, EnumType};

mod graph;
pub use graph::Graph;

mod metadata;
pub use metadata::{Include, Metadata, Reference};

mod name;
pub use name::QualifiedName;

mod navigation;
pub use navigation::{NavigationProperty, NavigationTarget};

mod path;
pub use path::PathTarget;

mod primitive;
pub use primitive::PrimitiveType;

mod property;
pub use property::{MaxLength, Property, PropertyId};

mod ty;
pub use ty::{Type, TypeId, TypeRef};

mod verify;

use crate::{raw::Element, Result};
use indexmap::IndexMap;
use std::fmt;

#[derive(Debug, Clone)]
pub struct Schema {
    /// Position of the schema within its document.
    pub id: SchemaId,

    pub namespace: String,

    pub alias: Option<String>,

    /// Dialect of the document the schema came from.
    pub dialect: Dialect,

    /// Entity, complex and enum types by local name. [`TypeId::index`]
    /// indexes this map.
    pub types: IndexMap<String, Type>,

    /// Associations by local name. [`AssociationId::index`] indexes this map.
    pub associations: IndexMap<String, Association>,

    /// Containers by name. [`ContainerId::index`] indexes this map.
    pub containers: IndexMap<String, EntityContainer>,

    /// `Annotations` blocks declared in the schema.
    pub annotations: Vec<Annotations>,

    /// Vocabulary aliases declared by the enclosing document, alias to
    /// namespace.
    pub vocabulary_aliases: IndexMap<String, String>,
}

/// Identifies a schema within its document. A schema built on its own is
/// always `SchemaId(0)`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(pub usize);

impl Schema {
    pub fn builder(dialect: Dialect) -> Builder {
        Builder::new(dialect)
    }

    /// Builds and resolves a schema from its raw `Schema` element.
    pub fn from_raw(raw: &Element, dialect: Dialect) -> Result<Schema> {
        Builder::new(dialect).build(raw)
    }

    /// Strips this schema's namespace or alias from `name`. Returns `None` if
    /// the name is qualified by some other namespace.
    pub fn local_name<'a>(&self, name: &'a str) -> Option<&'a str> {
        let qualified = QualifiedName::parse(name.trim());

        match qualified.qualifier {
            None => Some(qualified.name),
            Some(qualifier) if self.is_named(qualifier) => Some(qualified.name),
            Some(_) => None,
        }
    }

    pub fn qualified_name(&self, local: &str) -> String {
        format!("{}.{}", self.namespace, local)
    }

    /// Whether `qualifier` is this schema's namespace or alias.
    pub fn is_named(&self, qualifier: &str) -> bool {
        qualifier == self.namespace || self.alias.as_deref() == Some(qualifier)
    }

    pub fn entity_types(&self) -> impl Iterator<Item = &EntityType> + '_ {
        self.types.values().filter_map(Type::as_entity)
    }

    pub fn complex_types(&self) -> impl Iterator<Item = &ComplexType> + '_ {
        self.types.values().filter_map(Type::as_complex)
    }

    pub fn enum_types(&self) -> impl Iterator<Item = &EnumType> + '_ {
        self.types.values().filter_map(Type::as_enum)
    }

    pub fn associations(&self) -> impl Iterator<Item = &Association> + '_ {
        self.associations.values()
    }

    pub fn entity_containers(&self) -> impl Iterator<Item = &EntityContainer> + '_ {
        self.containers.values()
    }
}

impl SchemaId {
    pub(crate) const fn placeholder() -> Self {
        Self(usize::MAX)
    }
}

impl fmt::Debug for SchemaId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "SchemaId({})", self.0)
    }
}
