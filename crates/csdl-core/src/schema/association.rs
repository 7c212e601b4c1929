use super::{EntityType, Graph, SchemaId, TypeId};
use crate::{raw::Element, Error, Result};
use std::fmt;

/// A named relationship between two entity-type roles (OData V2).
#[derive(Debug, Clone)]
pub struct Association {
    pub id: AssociationId,

    pub name: String,

    /// Exactly two ends with distinct roles.
    pub ends: [AssociationEnd; 2],

    pub referential_constraint: Option<ReferentialConstraint>,
}

#[derive(Debug, Clone)]
pub struct AssociationEnd {
    pub role: String,

    pub multiplicity: Multiplicity,

    /// Entity type name as written.
    pub type_name: String,

    /// Resolved entity type. Valid once the schema is built.
    pub ty: TypeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Multiplicity {
    /// `0..1`
    ZeroOrOne,
    /// `1`
    One,
    /// `*`
    Many,
}

#[derive(Debug, Clone)]
pub struct ReferentialConstraint {
    pub principal: ConstraintEnd,
    pub dependent: ConstraintEnd,
}

#[derive(Debug, Clone)]
pub struct ConstraintEnd {
    pub role: String,
    /// Names of the `PropertyRef`s, in order.
    pub properties: Vec<String>,
}

/// Identifies an association within its document.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssociationId {
    pub schema: SchemaId,
    pub index: usize,
}

impl Association {
    /// Builds the association from its own metadata fragment. Fails right
    /// away if the ends do not form a valid pair.
    pub(crate) fn from_raw(raw: &Element, id: AssociationId) -> Result<Self> {
        let name = raw.require_attr("Name", "Association")?;

        let parse = || -> Result<Self> {
            let ends: Vec<_> = raw
                .children("End")
                .map(AssociationEnd::from_raw)
                .collect::<Result<_>>()?;

            let Ok([first, second]) = <[AssociationEnd; 2]>::try_from(ends) else {
                return Err(Error::construction_invariant(format!(
                    "association must declare exactly two ends, found {}",
                    raw.children("End").count()
                )));
            };

            if first.role == second.role {
                return Err(Error::construction_invariant(format!(
                    "association ends must have distinct roles, both are `{}`",
                    first.role
                )));
            }

            let referential_constraint = raw
                .child("ReferentialConstraint")
                .map(ReferentialConstraint::from_raw)
                .transpose()?;

            Ok(Self {
                id,
                name: name.to_string(),
                ends: [first, second],
                referential_constraint,
            })
        };

        parse().map_err(|e| e.context(err!("Association `{name}`")))
    }

    pub fn end_by_role(&self, role: &str) -> Option<&AssociationEnd> {
        self.ends.iter().find(|end| end.role == role)
    }

    /// Like [`end_by_role`](Self::end_by_role) but fails with a schema
    /// consistency error naming the association.
    pub fn find_end_by_role(&self, role: &str) -> Result<&AssociationEnd> {
        self.end_by_role(role).ok_or_else(|| {
            Error::schema_consistency(format!(
                "association `{}` has no end with role `{role}`",
                self.name
            ))
        })
    }

    #[track_caller]
    pub(crate) fn expect_end_by_role(&self, role: &str) -> &AssociationEnd {
        self.end_by_role(role)
            .unwrap_or_else(|| panic!("association `{}` has no role `{role}`", self.name))
    }

    /// Index of the end with `role`.
    pub fn end_index(&self, role: &str) -> Option<usize> {
        self.ends.iter().position(|end| end.role == role)
    }

    /// The end opposite to `role`.
    pub fn other_end(&self, role: &str) -> Option<&AssociationEnd> {
        self.end_index(role).map(|index| &self.ends[1 - index])
    }
}

impl AssociationEnd {
    fn from_raw(raw: &Element) -> Result<Self> {
        let role = raw.require_attr("Role", "association End")?;
        let multiplicity = raw.require_attr("Multiplicity", "association End")?;

        Ok(Self {
            role: role.to_string(),
            multiplicity: Multiplicity::parse(multiplicity).ok_or_else(|| {
                Error::invalid_metadata(format!(
                    "end `{role}` has invalid multiplicity `{multiplicity}`"
                ))
            })?,
            type_name: raw.require_attr("Type", "association End")?.to_string(),
            ty: TypeId::placeholder(),
        })
    }

    /// The entity type playing this role.
    pub fn ty<'a>(&self, schema: &'a (impl Graph + ?Sized)) -> &'a EntityType {
        schema.entity_type(self.ty)
    }
}

impl Multiplicity {
    pub fn parse(src: &str) -> Option<Self> {
        match src {
            "0..1" => Some(Self::ZeroOrOne),
            "1" => Some(Self::One),
            "*" => Some(Self::Many),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ZeroOrOne => "0..1",
            Self::One => "1",
            Self::Many => "*",
        }
    }
}

impl ReferentialConstraint {
    fn from_raw(raw: &Element) -> Result<Self> {
        let end = |name: &str| -> Result<ConstraintEnd> {
            let raw = raw.child(name).ok_or_else(|| {
                Error::invalid_metadata(format!("ReferentialConstraint is missing `{name}`"))
            })?;

            Ok(ConstraintEnd {
                role: raw.require_attr("Role", name)?.to_string(),
                properties: raw
                    .children("PropertyRef")
                    .map(|r| r.require_attr("Name", "PropertyRef").map(str::to_string))
                    .collect::<Result<_>>()?,
            })
        };

        Ok(Self {
            principal: end("Principal")?,
            dependent: end("Dependent")?,
        })
    }
}

impl AssociationId {
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

impl fmt::Debug for AssociationId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "AssociationId({}/{})", self.schema.0, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn build(value: serde_json::Value) -> Result<Association> {
        let id = AssociationId {
            schema: SchemaId(0),
            index: 0,
        };
        Association::from_raw(&Element::from_json(&value).unwrap(), id)
    }

    fn end(role: &str, ty: &str, multiplicity: &str) -> serde_json::Value {
        json!({ "$": { "Role": role, "Type": ty, "Multiplicity": multiplicity } })
    }

    #[test]
    fn two_distinct_ends() {
        let association = build(json!({
            "$": { "Name": "R" },
            "End": [end("role1", "NS.A", "1"), end("role2", "NS.B", "*")],
        }))
        .unwrap();

        assert_eq!(association.ends[0].multiplicity, Multiplicity::One);
        assert_eq!(association.end_by_role("role2").unwrap().type_name, "NS.B");
        assert_eq!(association.other_end("role1").unwrap().role, "role2");
        assert!(association.end_by_role("role3").is_none());
        assert!(association.find_end_by_role("role3").unwrap_err().is_schema_consistency());
    }

    #[test]
    fn duplicate_roles_fail_at_construction() {
        let err = build(json!({
            "$": { "Name": "R" },
            "End": [end("same", "NS.A", "1"), end("same", "NS.B", "*")],
        }))
        .unwrap_err();

        assert!(err.is_construction_invariant());
        assert!(err.to_string().starts_with("Association `R`: "));
    }

    #[test]
    fn three_ends_fail_at_construction() {
        let err = build(json!({
            "$": { "Name": "R" },
            "End": [end("a", "NS.A", "1"), end("b", "NS.B", "*"), end("c", "NS.C", "*")],
        }))
        .unwrap_err();

        assert!(err.is_construction_invariant());
    }

    #[test]
    fn bad_multiplicity() {
        let err = build(json!({
            "$": { "Name": "R" },
            "End": [end("a", "NS.A", "many"), end("b", "NS.B", "*")],
        }))
        .unwrap_err();

        assert!(err.is_invalid_metadata());
    }
}
