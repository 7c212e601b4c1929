use super::{Annotation, AssociationSet, EntityType, Graph, SchemaId, TypeId, TypeRef};
use crate::{raw::Element, Result};
use indexmap::IndexMap;
use std::fmt;

/// Groups the entity sets, association sets and function imports a service
/// exposes.
#[derive(Debug, Clone)]
pub struct EntityContainer {
    pub id: ContainerId,

    pub name: String,

    /// Set from `m:IsDefaultEntityContainer`; a schema's only container is
    /// always the default.
    pub is_default: bool,

    pub entity_sets: Vec<EntitySet>,

    pub association_sets: Vec<AssociationSet>,

    pub function_imports: Vec<FunctionImport>,

    pub annotations: Vec<Annotation>,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId {
    pub schema: SchemaId,
    pub index: usize,
}

#[derive(Debug, Clone)]
pub struct EntitySet {
    pub id: EntitySetId,

    pub name: String,

    /// Entity type name as written.
    pub entity_type_name: String,

    /// Resolved entity type. Valid once the schema is built.
    pub entity_type: TypeId,

    /// `sap:` attributes keyed by local name.
    pub vendor_attrs: IndexMap<String, String>,

    pub annotations: Vec<Annotation>,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntitySetId {
    pub container: ContainerId,
    pub index: usize,
}

#[derive(Debug, Clone)]
pub struct FunctionImport {
    pub name: String,

    pub return_type_name: Option<String>,

    /// Resolved return type. Valid once the schema is built.
    pub return_type: Option<TypeRef>,

    pub entity_set_name: Option<String>,

    pub entity_set: Option<EntitySetId>,

    /// `m:HttpMethod` (V2).
    pub http_method: Option<String>,

    pub parameters: Vec<Parameter>,
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,

    pub type_name: String,

    pub ty: TypeRef,

    /// `In`, `Out` or `InOut` (V2).
    pub mode: Option<String>,

    pub nullable: bool,
}

impl EntityContainer {
    pub(crate) fn from_raw(raw: &Element, id: ContainerId) -> Result<Self> {
        let name = raw.require_attr("Name", "EntityContainer")?;

        let parse = || -> Result<Self> {
            let entity_sets = raw
                .children("EntitySet")
                .enumerate()
                .map(|(index, raw)| EntitySet::from_raw(raw, EntitySetId { container: id, index }))
                .collect::<Result<_>>()?;

            let is_default = match raw.bool_attr("m:IsDefaultEntityContainer")? {
                Some(is_default) => is_default,
                None => raw.bool_attr("IsDefaultEntityContainer")?.unwrap_or(false),
            };

            Ok(Self {
                id,
                name: name.to_string(),
                is_default,
                entity_sets,
                association_sets: raw
                    .children("AssociationSet")
                    .map(AssociationSet::from_raw)
                    .collect::<Result<_>>()?,
                function_imports: raw
                    .children("FunctionImport")
                    .map(FunctionImport::from_raw)
                    .collect::<Result<_>>()?,
                annotations: Annotation::all_from_raw(raw)?,
            })
        };

        parse().map_err(|e| e.context(err!("EntityContainer `{name}`")))
    }

    pub fn entity_set(&self, name: &str) -> Option<&EntitySet> {
        self.entity_sets.iter().find(|set| set.name == name)
    }

    pub fn association_set(&self, name: &str) -> Option<&AssociationSet> {
        self.association_sets.iter().find(|set| set.name == name)
    }

    pub fn function_import(&self, name: &str) -> Option<&FunctionImport> {
        self.function_imports.iter().find(|f| f.name == name)
    }

    /// Entity sets whose entity type is `ty`.
    pub fn entity_sets_of(&self, ty: TypeId) -> impl Iterator<Item = &EntitySet> + '_ {
        self.entity_sets
            .iter()
            .filter(move |set| set.entity_type == ty)
    }
}

impl EntitySet {
    fn from_raw(raw: &Element, id: EntitySetId) -> Result<Self> {
        let name = raw.require_attr("Name", "EntitySet")?;

        let parse = || -> Result<Self> {
            Ok(Self {
                id,
                name: name.to_string(),
                entity_type_name: raw.require_attr("EntityType", "EntitySet")?.to_string(),
                entity_type: TypeId::placeholder(),
                vendor_attrs: raw.vendor_attrs("sap"),
                annotations: Annotation::all_from_raw(raw)?,
            })
        };

        parse().map_err(|e| e.context(err!("EntitySet `{name}`")))
    }

    pub fn entity_type<'a>(&self, schema: &'a (impl Graph + ?Sized)) -> &'a EntityType {
        schema.entity_type(self.entity_type)
    }
}

impl FunctionImport {
    fn from_raw(raw: &Element) -> Result<Self> {
        let name = raw.require_attr("Name", "FunctionImport")?;

        let parse = || -> Result<Self> {
            Ok(Self {
                name: name.to_string(),
                return_type_name: raw.attr("ReturnType").map(str::to_string),
                return_type: None,
                entity_set_name: raw.attr("EntitySet").map(str::to_string),
                entity_set: None,
                http_method: raw.attr("m:HttpMethod").map(str::to_string),
                parameters: raw
                    .children("Parameter")
                    .map(Parameter::from_raw)
                    .collect::<Result<_>>()?,
            })
        };

        parse().map_err(|e| e.context(err!("FunctionImport `{name}`")))
    }
}

impl Parameter {
    fn from_raw(raw: &Element) -> Result<Self> {
        Ok(Self {
            name: raw.require_attr("Name", "Parameter")?.to_string(),
            type_name: raw.require_attr("Type", "Parameter")?.to_string(),
            ty: TypeRef::placeholder(),
            mode: raw.attr("Mode").map(str::to_string),
            nullable: raw.bool_attr("Nullable")?.unwrap_or(true),
        })
    }
}

impl EntitySetId {
    pub(crate) const fn placeholder() -> Self {
        Self {
            container: ContainerId {
                schema: SchemaId::placeholder(),
                index: usize::MAX,
            },
            index: usize::MAX,
        }
    }
}

impl fmt::Debug for ContainerId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "ContainerId({}/{})", self.schema.0, self.index)
    }
}

impl fmt::Debug for EntitySetId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            fmt,
            "EntitySetId({}/{}/{})",
            self.container.schema.0, self.container.index, self.index
        )
    }
}
