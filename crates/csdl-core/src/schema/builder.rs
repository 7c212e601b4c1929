use super::{
    graph, Annotations, Association, AssociationId, ComplexType, ContainerId, Dialect,
    EntityContainer, EntitySetId, EntityType, EnumType, Graph, NavigationTarget, QualifiedName,
    Schema, SchemaId, Type, TypeId, TypeRef,
};
use crate::{raw::Element, Error, Result};
use indexmap::IndexMap;

#[derive(Debug)]
pub struct Builder {
    dialect: Dialect,

    /// Vocabulary aliases (alias to namespace) declared by the document.
    vocabulary_aliases: IndexMap<String, String>,
}

/// Used to track state while cross references are resolved.
struct BuildDocument {
    /// Phase 1 output, one entry per `Schema` element. Every node exists,
    /// references are placeholders.
    schemas: Vec<Schema>,
}

/// Name lookups as written inside one schema of a document. Bare names and
/// names qualified by the schema itself resolve locally, any other
/// qualifier resolves in the schema it names.
#[derive(Clone, Copy)]
pub(super) struct Scope<'a> {
    pub(super) document: &'a [Schema],
    pub(super) schema: &'a Schema,
}

impl Builder {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            vocabulary_aliases: IndexMap::new(),
        }
    }

    pub fn vocabulary_alias(&mut self, alias: &str, namespace: &str) -> &mut Self {
        self.vocabulary_aliases
            .insert(alias.to_string(), namespace.to_string());
        self
    }

    /// Builds a schema that stands on its own.
    pub fn build(&self, raw: &Element) -> Result<Schema> {
        self.build_document([raw])?
            .pop()
            .ok_or_else(|| err!("no schema was built"))
    }

    /// Builds all schemas of one document. Phase 1 runs for every schema
    /// before phase 2 starts, so references may cross schema boundaries.
    pub fn build_document<'a>(
        &self,
        raws: impl IntoIterator<Item = &'a Element>,
    ) -> Result<Vec<Schema>> {
        let mut schemas: Vec<Schema> = vec![];

        // Phase 1: every node from its own fragment, no lookups.
        for raw in raws {
            let namespace = raw.require_attr("Namespace", "Schema")?;
            let id = SchemaId(schemas.len());

            let schema = self
                .collect(raw, id, namespace)
                .map_err(|e| e.context(err!("Schema `{namespace}`")))?;

            if schemas.iter().any(|s| s.namespace == schema.namespace) {
                return Err(Error::construction_invariant(format!(
                    "schema `{}` is declared more than once",
                    schema.namespace
                )));
            }

            schemas.push(schema);
        }

        // Phase 2: resolve references now that all nodes exist.
        let mut builder = BuildDocument { schemas };
        builder.link()?;

        let schemas = builder.schemas;
        for schema in &schemas {
            schema
                .verify(&schemas)
                .map_err(|e| e.context(err!("Schema `{}`", schema.namespace)))?;

            tracing::debug!(
                namespace = %schema.namespace,
                dialect = schema.dialect.name(),
                types = schema.types.len(),
                associations = schema.associations.len(),
                containers = schema.containers.len(),
                "schema resolved"
            );
        }

        Ok(schemas)
    }

    fn collect(&self, raw: &Element, id: SchemaId, namespace: &str) -> Result<Schema> {
        let mut schema = Schema {
            id,
            namespace: namespace.to_string(),
            alias: raw.attr("Alias").map(str::to_string),
            dialect: self.dialect,
            types: IndexMap::new(),
            associations: IndexMap::new(),
            containers: IndexMap::new(),
            annotations: vec![],
            vocabulary_aliases: self.vocabulary_aliases.clone(),
        };

        let type_id = |schema: &Schema| TypeId {
            schema: id,
            index: schema.types.len(),
        };

        for raw in raw.children("EntityType") {
            let ty = EntityType::from_raw(raw, type_id(&schema))?;
            insert_type(&mut schema, Type::Entity(ty))?;
        }

        for raw in raw.children("ComplexType") {
            let ty = ComplexType::from_raw(raw, type_id(&schema))?;
            insert_type(&mut schema, Type::Complex(ty))?;
        }

        for raw in raw.children("EnumType") {
            let ty = EnumType::from_raw(raw, type_id(&schema))?;
            insert_type(&mut schema, Type::Enum(ty))?;
        }

        for raw in raw.children("Association") {
            let id = AssociationId {
                schema: id,
                index: schema.associations.len(),
            };
            let association = Association::from_raw(raw, id)?;

            if schema.associations.contains_key(&association.name)
                || schema.types.contains_key(&association.name)
            {
                return Err(Error::construction_invariant(format!(
                    "name `{}` is declared more than once",
                    association.name
                )));
            }

            schema
                .associations
                .insert(association.name.clone(), association);
        }

        for raw in raw.children("EntityContainer") {
            let id = ContainerId {
                schema: id,
                index: schema.containers.len(),
            };
            let container = EntityContainer::from_raw(raw, id)?;

            if schema.containers.contains_key(&container.name) {
                return Err(Error::construction_invariant(format!(
                    "entity container `{}` is declared more than once",
                    container.name
                )));
            }

            schema.containers.insert(container.name.clone(), container);
        }

        if schema.containers.len() == 1 {
            if let Some((_, container)) = schema.containers.get_index_mut(0) {
                container.is_default = true;
            }
        }

        schema.annotations = raw
            .children("Annotations")
            .map(Annotations::from_raw)
            .collect::<Result<_>>()?;

        Ok(schema)
    }
}

impl<'a> Scope<'a> {
    pub(super) fn new(document: &'a [Schema], schema: &'a Schema) -> Self {
        Self { document, schema }
    }

    pub(super) fn get_type(&self, name: &str) -> Option<&'a Type> {
        match self.schema.local_name(name) {
            Some(local) => self.schema.types.get(local),
            None => self.document.get_type(name),
        }
    }

    fn find_type(&self, name: &str) -> Result<&'a Type> {
        self.get_type(name).ok_or_else(|| {
            Error::schema_consistency(format!(
                "type `{name}` is not declared in schema `{}`",
                self.owner(name)
            ))
        })
    }

    fn find_entity_type(&self, name: &str) -> Result<&'a EntityType> {
        graph::expect_entity(name, self.find_type(name)?)
    }

    fn find_association(&self, name: &str) -> Result<&'a Association> {
        let association = match self.schema.local_name(name) {
            Some(local) => self.schema.associations.get(local),
            None => self.document.get_association(name),
        };

        association.ok_or_else(|| {
            Error::schema_consistency(format!(
                "association `{name}` is not declared in schema `{}`",
                self.owner(name)
            ))
        })
    }

    fn resolve_type_ref(&self, name: &str) -> Result<TypeRef> {
        graph::type_ref(name, &|name| self.find_type(name))
    }

    /// Namespace of the schema `name` points into, for error messages.
    fn owner(&self, name: &str) -> String {
        if self.schema.local_name(name).is_some() {
            return self.schema.namespace.clone();
        }

        let qualifier = QualifiedName::parse(name.trim()).qualifier.unwrap_or_default();
        self.document
            .schema_named(qualifier)
            .map_or(qualifier, |schema| schema.namespace.as_str())
            .to_string()
    }
}

fn insert_type(schema: &mut Schema, ty: Type) -> Result<()> {
    if schema.types.contains_key(ty.name()) {
        return Err(Error::construction_invariant(format!(
            "type `{}` is declared more than once",
            ty.name()
        )));
    }

    schema.types.insert(ty.name().to_string(), ty);
    Ok(())
}

impl BuildDocument {
    fn link(&mut self) -> Result<()> {
        // Each step runs over every schema before the next step starts. Base
        // types go first: key inheritance and inherited property lookups
        // depend on them.
        self.each(Self::link_base_types)?;
        self.each(Self::check_base_type_cycles)?;
        self.each(Self::link_keys)?;
        self.each(Self::link_property_types)?;
        self.each(Self::link_association_ends)?;
        self.each(Self::link_navigation_properties)?;
        self.each(Self::link_entity_sets)?;
        self.each(Self::link_association_sets)?;
        self.each(Self::link_function_imports)?;
        Ok(())
    }

    fn each(&mut self, step: fn(&mut Self, usize) -> Result<()>) -> Result<()> {
        for s in 0..self.schemas.len() {
            step(self, s).map_err(|e| e.context(err!("Schema `{}`", self.schemas[s].namespace)))?;
        }

        Ok(())
    }

    fn scope(&self, s: usize) -> Scope<'_> {
        Scope::new(&self.schemas, &self.schemas[s])
    }

    fn link_base_types(&mut self, s: usize) -> Result<()> {
        for index in 0..self.schemas[s].types.len() {
            let scope = self.scope(s);
            let Type::Entity(entity) = &scope.schema.types[index] else {
                continue;
            };
            let Some(base_name) = &entity.base_type_name else {
                continue;
            };

            let base = scope
                .find_entity_type(base_name)
                .map(|base| base.id)
                .map_err(|e| e.context(err!("EntityType `{}`: base type", entity.name)))?;

            self.schemas[s].types[index].expect_entity_mut().base_type = Some(base);
        }

        Ok(())
    }

    fn check_base_type_cycles(&mut self, s: usize) -> Result<()> {
        let document = &self.schemas[..];
        let limit: usize = document.iter().map(|schema| schema.types.len()).sum();

        // Walking more steps than there are types means the chain loops.
        for entity in document[s].entity_types() {
            let mut current = entity.base_type;
            let mut steps = 0;

            while let Some(id) = current {
                steps += 1;
                if steps > limit || id == entity.id {
                    return Err(Error::schema_consistency(format!(
                        "entity type `{}` inherits from itself",
                        entity.name
                    )));
                }
                current = document.entity_type(id).base_type;
            }
        }

        Ok(())
    }

    fn link_keys(&mut self, s: usize) -> Result<()> {
        for index in 0..self.schemas[s].types.len() {
            let document = &self.schemas[..];
            let Type::Entity(entity) = &document[s].types[index] else {
                continue;
            };

            let key = if entity.key.is_empty() {
                document
                    .base_types(entity.id)
                    .find(|ty| !ty.key.is_empty())
                    .map(|ty| ty.key.clone())
                    .ok_or_else(|| {
                        Error::schema_consistency(format!(
                            "entity type `{}` has no key, declared or inherited",
                            entity.name
                        ))
                    })?
            } else {
                entity.key.clone()
            };

            for name in &key {
                if document.find_property(entity.id, name).is_none() {
                    return Err(Error::schema_consistency(format!(
                        "key property `{name}` is not declared"
                    ))
                    .context(err!("EntityType `{}`", entity.name)));
                }
            }

            self.schemas[s].types[index].expect_entity_mut().key = key;
        }

        Ok(())
    }

    fn link_property_types(&mut self, s: usize) -> Result<()> {
        for index in 0..self.schemas[s].types.len() {
            let scope = self.scope(s);
            let ty = &scope.schema.types[index];

            let resolved = ty
                .properties()
                .iter()
                .map(|property| {
                    let resolved = scope.resolve_type_ref(&property.type_name)?;

                    if resolved.is_entity() {
                        return Err(Error::schema_consistency(format!(
                            "structural property cannot have entity type `{}`",
                            property.type_name
                        )));
                    }

                    Ok(resolved)
                })
                .enumerate()
                .map(|(i, resolved)| {
                    resolved.map_err(|e| {
                        e.context(err!(
                            "{} `{}`: property `{}`",
                            ty.kind_name(),
                            ty.name(),
                            ty.properties()[i].name
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            let properties = self.schemas[s].types[index].properties_mut();
            for (property, ty) in properties.iter_mut().zip(resolved) {
                property.ty = ty;
            }
        }

        Ok(())
    }

    fn link_association_ends(&mut self, s: usize) -> Result<()> {
        for index in 0..self.schemas[s].associations.len() {
            let scope = self.scope(s);
            let association = &scope.schema.associations[index];

            let resolve = || -> Result<Vec<TypeId>> {
                let ids = association
                    .ends
                    .iter()
                    .map(|end| {
                        scope
                            .find_entity_type(&end.type_name)
                            .map(|ty| ty.id)
                            .map_err(|e| e.context(err!("end `{}`", end.role)))
                    })
                    .collect::<Result<Vec<_>>>()?;

                if let Some(constraint) = &association.referential_constraint {
                    for side in [&constraint.principal, &constraint.dependent] {
                        let end = association.find_end_by_role(&side.role)?;
                        let ty = ids[association.end_index(&end.role).unwrap_or_default()];

                        for name in &side.properties {
                            if scope.document.find_property(ty, name).is_none() {
                                return Err(Error::schema_consistency(format!(
                                    "referential constraint names property `{name}` \
                                     missing from `{}`",
                                    end.type_name
                                )));
                            }
                        }
                    }
                }

                Ok(ids)
            };

            let ids =
                resolve().map_err(|e| e.context(err!("Association `{}`", association.name)))?;

            let association = &mut self.schemas[s].associations[index];
            for (end, id) in association.ends.iter_mut().zip(ids) {
                end.ty = id;
            }
        }

        Ok(())
    }

    fn link_navigation_properties(&mut self, s: usize) -> Result<()> {
        for index in 0..self.schemas[s].types.len() {
            let scope = self.scope(s);
            let Type::Entity(entity) = &scope.schema.types[index] else {
                continue;
            };

            let mut resolved = Vec::with_capacity(entity.navigation_properties.len());

            for navigation in &entity.navigation_properties {
                let resolve = || -> Result<NavigationTarget> {
                    Ok(match &navigation.target {
                        NavigationTarget::Association {
                            relationship,
                            from_role,
                            to_role,
                            ..
                        } => {
                            let association = scope.find_association(relationship)?;
                            association.find_end_by_role(from_role)?;
                            association.find_end_by_role(to_role)?;

                            if from_role == to_role {
                                return Err(Error::schema_consistency(format!(
                                    "`FromRole` and `ToRole` are both `{from_role}`"
                                )));
                            }

                            NavigationTarget::Association {
                                relationship: relationship.clone(),
                                from_role: from_role.clone(),
                                to_role: to_role.clone(),
                                association: association.id,
                            }
                        }
                        NavigationTarget::Typed {
                            type_name,
                            partner,
                            nullable,
                            ..
                        } => {
                            let ty = scope.resolve_type_ref(type_name)?;

                            let TypeRef::Entity(target) = ty.element() else {
                                return Err(Error::schema_consistency(format!(
                                    "navigation target `{type_name}` is not an entity type"
                                )));
                            };

                            if let Some(partner) = partner {
                                let document = scope.document;
                                if document.find_navigation_property(*target, partner).is_none() {
                                    return Err(Error::schema_consistency(format!(
                                        "partner `{partner}` is not a navigation property \
                                         of `{type_name}`"
                                    )));
                                }
                            }

                            NavigationTarget::Typed {
                                type_name: type_name.clone(),
                                ty: ty.clone(),
                                partner: partner.clone(),
                                nullable: *nullable,
                            }
                        }
                    })
                };

                resolved.push(resolve().map_err(|e| {
                    e.context(err!(
                        "EntityType `{}`: navigation property `{}`",
                        entity.name,
                        navigation.name
                    ))
                })?);
            }

            let entity = self.schemas[s].types[index].expect_entity_mut();
            for (navigation, target) in entity.navigation_properties.iter_mut().zip(resolved) {
                navigation.target = target;
            }
        }

        Ok(())
    }

    fn link_entity_sets(&mut self, s: usize) -> Result<()> {
        for index in 0..self.schemas[s].containers.len() {
            let scope = self.scope(s);
            let container = &scope.schema.containers[index];

            let resolved = container
                .entity_sets
                .iter()
                .map(|set| {
                    scope
                        .find_entity_type(&set.entity_type_name)
                        .map(|ty| ty.id)
                        .map_err(|e| {
                            e.context(err!(
                                "EntityContainer `{}`: EntitySet `{}`",
                                container.name,
                                set.name
                            ))
                        })
                })
                .collect::<Result<Vec<_>>>()?;

            let container = &mut self.schemas[s].containers[index];
            for (set, ty) in container.entity_sets.iter_mut().zip(resolved) {
                set.entity_type = ty;
            }
        }

        Ok(())
    }

    fn link_association_sets(&mut self, s: usize) -> Result<()> {
        for index in 0..self.schemas[s].containers.len() {
            let scope = self.scope(s);
            let container = &scope.schema.containers[index];
            let mut resolved = Vec::with_capacity(container.association_sets.len());

            for set in &container.association_sets {
                let resolve = || -> Result<(AssociationId, Vec<(EntitySetId, usize)>)> {
                    let association = scope.find_association(&set.association_name)?;

                    let ends = set
                        .ends
                        .iter()
                        .map(|end| {
                            let end_index = association.end_index(&end.role).ok_or_else(|| {
                                Error::schema_consistency(format!(
                                    "association `{}` has no end with role `{}`",
                                    association.name, end.role
                                ))
                            })?;

                            let entity_set =
                                container.entity_set(&end.entity_set_name).ok_or_else(|| {
                                    Error::schema_consistency(format!(
                                        "entity set `{}` is not declared in container `{}`",
                                        end.entity_set_name, container.name
                                    ))
                                })?;

                            // End types were linked in the association's own
                            // schema, which may not be this one.
                            let end_ty = association.ends[end_index].ty;

                            if !scope.document.is_same_or_derived(entity_set.entity_type, end_ty) {
                                return Err(Error::schema_consistency(format!(
                                    "entity set `{}` holds `{}`, but role `{}` requires `{}`",
                                    entity_set.name,
                                    entity_set.entity_type_name,
                                    end.role,
                                    association.ends[end_index].type_name
                                )));
                            }

                            Ok((entity_set.id, end_index))
                        })
                        .collect::<Result<Vec<_>>>()?;

                    Ok((association.id, ends))
                };

                resolved.push(resolve().map_err(|e| {
                    e.context(err!(
                        "EntityContainer `{}`: AssociationSet `{}`",
                        container.name,
                        set.name
                    ))
                })?);
            }

            let container = &mut self.schemas[s].containers[index];
            for (set, (association, ends)) in container.association_sets.iter_mut().zip(resolved) {
                set.association = association;
                for (end, (entity_set, end_index)) in set.ends.iter_mut().zip(ends) {
                    end.entity_set = entity_set;
                    end.end = end_index;
                }
            }
        }

        Ok(())
    }

    fn link_function_imports(&mut self, s: usize) -> Result<()> {
        for index in 0..self.schemas[s].containers.len() {
            let scope = self.scope(s);
            let container = &scope.schema.containers[index];
            let mut resolved = Vec::with_capacity(container.function_imports.len());

            for function in &container.function_imports {
                let resolve = || -> Result<_> {
                    let return_type = function
                        .return_type_name
                        .as_deref()
                        .map(|name| scope.resolve_type_ref(name))
                        .transpose()?;

                    let entity_set = match &function.entity_set_name {
                        Some(name) => Some(
                            container
                                .entity_set(name)
                                .ok_or_else(|| {
                                    Error::schema_consistency(format!(
                                        "entity set `{name}` is not declared in container `{}`",
                                        container.name
                                    ))
                                })?
                                .id,
                        ),
                        None => None,
                    };

                    let parameters = function
                        .parameters
                        .iter()
                        .map(|parameter| {
                            scope
                                .resolve_type_ref(&parameter.type_name)
                                .map_err(|e| e.context(err!("parameter `{}`", parameter.name)))
                        })
                        .collect::<Result<Vec<_>>>()?;

                    Ok((return_type, entity_set, parameters))
                };

                resolved.push(resolve().map_err(|e| {
                    e.context(err!(
                        "EntityContainer `{}`: FunctionImport `{}`",
                        container.name,
                        function.name
                    ))
                })?);
            }

            let container = &mut self.schemas[s].containers[index];
            for (function, (return_type, entity_set, parameters)) in
                container.function_imports.iter_mut().zip(resolved)
            {
                function.return_type = return_type;
                function.entity_set = entity_set;
                for (parameter, ty) in function.parameters.iter_mut().zip(parameters) {
                    parameter.ty = ty;
                }
            }
        }

        Ok(())
    }
}
