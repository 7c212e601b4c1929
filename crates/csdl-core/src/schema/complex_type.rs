use super::{Annotation, Property, PropertyId, TypeId};
use crate::{raw::Element, Result};

#[derive(Debug, Clone)]
pub struct ComplexType {
    pub id: TypeId,

    pub name: String,

    pub properties: Vec<Property>,

    pub annotations: Vec<Annotation>,
}

impl ComplexType {
    pub(crate) fn from_raw(raw: &Element, id: TypeId) -> Result<Self> {
        let name = raw.require_attr("Name", "ComplexType")?;

        let parse = || -> Result<Self> {
            Ok(Self {
                id,
                name: name.to_string(),
                properties: raw
                    .children("Property")
                    .enumerate()
                    .map(|(index, raw)| Property::from_raw(raw, PropertyId { ty: id, index }))
                    .collect::<Result<_>>()?,
                annotations: Annotation::all_from_raw(raw)?,
            })
        };

        parse().map_err(|e| e.context(err!("ComplexType `{name}`")))
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|property| property.name == name)
    }
}
