use super::{
    path, Association, AssociationId, CollectionType, ContainerId, EntityContainer, EntitySet,
    EntitySetId, EntityType, NavigationProperty, PathTarget, PrimitiveType, Property, PropertyId,
    QualifiedName, Schema, SchemaId, Type, TypeId, TypeRef,
};
use crate::{Error, Result};

/// Resolved nodes reachable from one or more schemas of a document.
///
/// IDs carry the [`SchemaId`] of the declaring schema, so an ID handed out
/// by one schema may point into another schema of the same document. Such
/// IDs only resolve through a graph that holds both schemas, usually the
/// [`Metadata`](super::Metadata) they were built in.
///
/// Qualified names resolve in the schema their namespace or alias names.
/// Bare names resolve in the first schema declaring them.
pub trait Graph {
    /// The schemas of the graph, in document order.
    fn schemas(&self) -> &[Schema];

    /// Get a schema by ID
    #[track_caller]
    fn schema_of(&self, id: SchemaId) -> &Schema {
        self.schemas()
            .iter()
            .find(|schema| schema.id == id)
            .expect("invalid schema ID")
    }

    /// The schema with the given namespace or alias.
    fn schema_named(&self, qualifier: &str) -> Option<&Schema> {
        self.schemas().iter().find(|schema| schema.is_named(qualifier))
    }

    fn get_type(&self, name: &str) -> Option<&Type> {
        lookup(self.schemas(), name, |schema, local| schema.types.get(local))
    }

    fn find_type(&self, name: &str) -> Result<&Type> {
        self.get_type(name).ok_or_else(|| not_declared(self.schemas(), "type", name))
    }

    /// Looks up an entity type by name, failing if the name is missing or
    /// names some other kind of type.
    fn find_entity_type(&self, name: &str) -> Result<&EntityType> {
        expect_entity(name, self.find_type(name)?)
    }

    /// Get a type by ID
    #[track_caller]
    fn ty(&self, id: TypeId) -> &Type {
        self.schema_of(id.schema)
            .types
            .get_index(id.index)
            .map(|(_, ty)| ty)
            .expect("invalid type ID")
    }

    #[track_caller]
    fn entity_type(&self, id: TypeId) -> &EntityType {
        self.ty(id).expect_entity()
    }

    /// Get a property by ID
    #[track_caller]
    fn property(&self, id: PropertyId) -> &Property {
        self.ty(id.ty)
            .properties()
            .get(id.index)
            .expect("invalid property ID")
    }

    /// The entity type itself followed by its base types, nearest first.
    fn base_types(&self, id: TypeId) -> impl Iterator<Item = &EntityType> + '_ {
        let limit = self.schemas().iter().map(|schema| schema.types.len()).sum();

        std::iter::successors(Some(self.entity_type(id)), |ty| {
            ty.base_type.map(|base| self.entity_type(base))
        })
        .take(limit)
    }

    /// Whether `ty` is `base` or (transitively) derives from it.
    fn is_same_or_derived(&self, ty: TypeId, base: TypeId) -> bool {
        match self.ty(ty) {
            Type::Entity(_) => self.base_types(ty).any(|ty| ty.id == base),
            _ => ty == base,
        }
    }

    /// Finds a property declared on `ty` or, for entity types, inherited
    /// from a base type.
    fn find_property(&self, ty: TypeId, name: &str) -> Option<&Property> {
        match self.ty(ty) {
            Type::Entity(_) => self.base_types(ty).find_map(|ty| ty.property(name)),
            other => other.properties().iter().find(|p| p.name == name),
        }
    }

    /// Finds a navigation property declared on `ty` or inherited.
    fn find_navigation_property(&self, ty: TypeId, name: &str) -> Option<&NavigationProperty> {
        if !self.ty(ty).is_entity() {
            return None;
        }

        self.base_types(ty).find_map(|ty| ty.navigation_property(name))
    }

    fn get_association(&self, name: &str) -> Option<&Association> {
        lookup(self.schemas(), name, |schema, local| schema.associations.get(local))
    }

    fn find_association(&self, name: &str) -> Result<&Association> {
        self.get_association(name)
            .ok_or_else(|| not_declared(self.schemas(), "association", name))
    }

    /// Get an association by ID
    #[track_caller]
    fn association(&self, id: AssociationId) -> &Association {
        self.schema_of(id.schema)
            .associations
            .get_index(id.index)
            .map(|(_, association)| association)
            .expect("invalid association ID")
    }

    #[track_caller]
    fn container(&self, id: ContainerId) -> &EntityContainer {
        self.schema_of(id.schema)
            .containers
            .get_index(id.index)
            .map(|(_, container)| container)
            .expect("invalid container ID")
    }

    /// The default container of the first schema that has one.
    fn default_entity_container(&self) -> Option<&EntityContainer> {
        self.schemas()
            .iter()
            .flat_map(|schema| schema.containers.values())
            .find(|container| container.is_default)
    }

    #[track_caller]
    fn entity_set(&self, id: EntitySetId) -> &EntitySet {
        self.container(id.container)
            .entity_sets
            .get(id.index)
            .expect("invalid entity set ID")
    }

    /// Finds an entity set by name, preferring the default container.
    fn get_entity_set(&self, name: &str) -> Option<&EntitySet> {
        self.default_entity_container()
            .and_then(|container| container.entity_set(name))
            .or_else(|| {
                self.schemas()
                    .iter()
                    .flat_map(|schema| schema.containers.values())
                    .find_map(|container| container.entity_set(name))
            })
    }

    /// Resolves a type name (primitive, named, or `Collection(...)`) into a
    /// [`TypeRef`].
    fn resolve_type_ref(&self, name: &str) -> Result<TypeRef> {
        type_ref(name, &|name| self.find_type(name))
    }

    /// Resolves `path` starting at the structured type `from`. Navigation
    /// and complex-typed property segments may be followed by further
    /// segments. Returns `None` if any segment does not resolve.
    fn resolve_path(&self, from: TypeId, path: &str) -> Option<PathTarget> {
        path::resolve(self, from, path)
    }
}

impl Graph for Schema {
    fn schemas(&self) -> &[Schema] {
        std::slice::from_ref(self)
    }
}

impl Graph for [Schema] {
    fn schemas(&self) -> &[Schema] {
        self
    }
}

fn lookup<'a, T>(
    schemas: &'a [Schema],
    name: &str,
    get: impl Fn(&'a Schema, &str) -> Option<&'a T>,
) -> Option<&'a T> {
    let qualified = QualifiedName::parse(name.trim());

    match qualified.qualifier {
        Some(qualifier) => schemas
            .iter()
            .find(|schema| schema.is_named(qualifier))
            .and_then(|schema| get(schema, qualified.name)),
        None => schemas.iter().find_map(|schema| get(schema, qualified.name)),
    }
}

fn not_declared(schemas: &[Schema], kind: &str, name: &str) -> Error {
    let qualified = QualifiedName::parse(name.trim());

    let scope = match (qualified.qualifier, schemas) {
        (Some(qualifier), _) => schemas
            .iter()
            .find(|schema| schema.is_named(qualifier))
            .map_or(qualifier, |schema| schema.namespace.as_str()),
        (None, [schema]) => schema.namespace.as_str(),
        (None, _) => {
            return Error::schema_consistency(format!("{kind} `{name}` is not declared"));
        }
    };

    Error::schema_consistency(format!("{kind} `{name}` is not declared in schema `{scope}`"))
}

pub(super) fn expect_entity<'a>(name: &str, ty: &'a Type) -> Result<&'a EntityType> {
    match ty {
        Type::Entity(ty) => Ok(ty),
        other => Err(Error::schema_consistency(format!(
            "`{name}` is a {}, expected an EntityType",
            other.kind_name()
        ))),
    }
}

/// Builds a [`TypeRef`], looking up named types through `find`.
pub(super) fn type_ref<'a>(name: &str, find: &dyn Fn(&str) -> Result<&'a Type>) -> Result<TypeRef> {
    if let Some(element) = CollectionType::element_name(name) {
        return Ok(CollectionType::new(type_ref(element, find)?).into());
    }

    if name.starts_with("Edm.") {
        return PrimitiveType::from_name(name).map(TypeRef::from).ok_or_else(|| {
            Error::schema_consistency(format!("unknown primitive type `{name}`"))
        });
    }

    Ok(find(name)?.type_ref())
}
