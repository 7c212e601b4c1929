use super::{PrimitiveType, TypeId};
use crate::{raw::Element, Error, Result};

#[derive(Debug, Clone)]
pub struct EnumType {
    pub id: TypeId,

    pub name: String,

    /// Defaults to `Edm.Int32`.
    pub underlying_type: PrimitiveType,

    pub is_flags: bool,

    pub members: Vec<EnumMember>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMember {
    pub name: String,
    pub value: i64,
}

impl EnumType {
    pub(crate) fn from_raw(raw: &Element, id: TypeId) -> Result<Self> {
        let name = raw.require_attr("Name", "EnumType")?;

        let parse = || -> Result<Self> {
            let underlying_type = match raw.attr("UnderlyingType") {
                Some(ty) => PrimitiveType::from_name(ty)
                    .filter(|ty| ty.is_integral())
                    .ok_or_else(|| {
                        Error::invalid_metadata(format!("`{ty}` is not an integral type"))
                    })?,
                None => PrimitiveType::Int32,
            };

            let mut members: Vec<EnumMember> = vec![];

            for member in raw.children("Member") {
                let member_name = member.require_attr("Name", "Member")?;

                // Members without a value count up from the previous one.
                let value = match member.attr("Value") {
                    Some(value) => value.parse().map_err(|_| {
                        Error::invalid_metadata(format!(
                            "member `{member_name}` has invalid value `{value}`"
                        ))
                    })?,
                    None => members.last().map(|prev| prev.value + 1).unwrap_or(0),
                };

                if members.iter().any(|m| m.name == member_name) {
                    return Err(Error::construction_invariant(format!(
                        "member `{member_name}` is declared more than once"
                    )));
                }

                members.push(EnumMember {
                    name: member_name.to_string(),
                    value,
                });
            }

            Ok(Self {
                id,
                name: name.to_string(),
                underlying_type,
                is_flags: raw.bool_attr("IsFlags")?.unwrap_or(false),
                members,
            })
        };

        parse().map_err(|e| e.context(err!("EnumType `{name}`")))
    }

    pub fn member(&self, name: &str) -> Option<&EnumMember> {
        self.members.iter().find(|member| member.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaId;
    use serde_json::json;

    #[test]
    fn implicit_values_count_up() {
        let raw = Element::from_json(&json!({
            "$": { "Name": "Color" },
            "Member": [
                { "$": { "Name": "Red" } },
                { "$": { "Name": "Green", "Value": "5" } },
                { "$": { "Name": "Blue" } },
            ],
        }))
        .unwrap();

        let ty = EnumType::from_raw(&raw, TypeId { schema: SchemaId(0), index: 0 }).unwrap();
        let values: Vec<_> = ty.members.iter().map(|m| m.value).collect();
        assert_eq!(values, [0, 5, 6]);
        assert_eq!(ty.underlying_type, PrimitiveType::Int32);
    }

    #[test]
    fn non_integral_underlying_type() {
        let raw = Element::from_json(&json!({
            "$": { "Name": "Color", "UnderlyingType": "Edm.String" },
        }))
        .unwrap();

        let err = EnumType::from_raw(&raw, TypeId { schema: SchemaId(0), index: 0 }).unwrap_err();
        assert!(err.is_invalid_metadata());
        assert!(err.to_string().contains("EnumType `Color`"));
    }
}
