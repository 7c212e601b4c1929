use super::{Annotation, NavigationProperty, Property, PropertyId, TypeId};
use crate::{raw::Element, Error, Result};
use indexmap::IndexMap;

/// A named structured type with a key.
///
/// Built in phase 1 from its own metadata fragment. The base type, property
/// types and navigation targets are filled in by phase 2; an inherited key
/// is copied in at the same time.
#[derive(Debug, Clone)]
pub struct EntityType {
    pub id: TypeId,

    pub name: String,

    pub base_type_name: Option<String>,

    /// Resolved base type. Valid once the schema is built.
    pub base_type: Option<TypeId>,

    pub is_abstract: bool,

    pub has_stream: bool,

    /// Key property names, in declaration order. Includes an inherited key.
    pub key: Vec<String>,

    pub properties: Vec<Property>,

    pub navigation_properties: Vec<NavigationProperty>,

    /// `sap:` attributes keyed by local name.
    pub vendor_attrs: IndexMap<String, String>,

    pub annotations: Vec<Annotation>,
}

impl EntityType {
    pub(crate) fn from_raw(raw: &Element, id: TypeId) -> Result<Self> {
        let name = raw.require_attr("Name", "EntityType")?;

        let parse = || -> Result<Self> {
            let key = match raw.child("Key") {
                Some(key) => key
                    .children("PropertyRef")
                    .map(|r| r.require_attr("Name", "PropertyRef").map(str::to_string))
                    .collect::<Result<Vec<_>>>()?,
                None => vec![],
            };

            let properties = raw
                .children("Property")
                .enumerate()
                .map(|(index, raw)| Property::from_raw(raw, PropertyId { ty: id, index }))
                .collect::<Result<Vec<_>>>()?;

            let mut seen = std::collections::HashSet::new();
            for property in &properties {
                if !seen.insert(property.name.as_str()) {
                    return Err(Error::construction_invariant(format!(
                        "property `{}` is declared more than once",
                        property.name
                    )));
                }
            }

            let base_type_name = raw.attr("BaseType").map(str::to_string);

            if key.is_empty() && base_type_name.is_none() {
                return Err(Error::construction_invariant(
                    "entity type declares no key and has no base type",
                ));
            }

            Ok(Self {
                id,
                name: name.to_string(),
                base_type_name,
                base_type: None,
                is_abstract: raw.bool_attr("Abstract")?.unwrap_or(false),
                has_stream: match raw.bool_attr("m:HasStream")? {
                    Some(has_stream) => has_stream,
                    None => raw.bool_attr("HasStream")?.unwrap_or(false),
                },
                key,
                properties,
                navigation_properties: raw
                    .children("NavigationProperty")
                    .map(NavigationProperty::from_raw)
                    .collect::<Result<_>>()?,
                vendor_attrs: raw.vendor_attrs("sap"),
                annotations: Annotation::all_from_raw(raw)?,
            })
        };

        parse().map_err(|e| e.context(err!("EntityType `{name}`")))
    }

    /// A property declared directly on this type.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|property| property.name == name)
    }

    pub fn navigation_property(&self, name: &str) -> Option<&NavigationProperty> {
        self.navigation_properties
            .iter()
            .find(|navigation| navigation.name == name)
    }

    /// Key properties declared directly on this type. Keys inherited from a
    /// base type are resolved through [`Graph::find_property`](super::Graph::find_property).
    pub fn key_properties(&self) -> impl Iterator<Item = &Property> + '_ {
        self.key.iter().filter_map(|name| self.property(name))
    }

    pub fn is_key(&self, name: &str) -> bool {
        self.key.iter().any(|key| key == name)
    }
}
